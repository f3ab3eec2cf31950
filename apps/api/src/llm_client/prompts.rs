// Shared prompt fragments. Each feature module keeps its own prompts.rs
// alongside it; only cross-cutting pieces live here.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to every prompt that reads candidate documents.
pub const FAIRNESS_INSTRUCTION: &str = "\
    Evaluate candidates strictly on skills, experience and evidence in the document. \
    Ignore names, age, gender, nationality, photos and any other protected attribute. \
    Never invent experience that the document does not state.";

/// Builds a system prompt from a role description plus the JSON-only rules.
pub fn json_system(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM}")
}

/// Expands `{name}` placeholders in a single left-to-right pass.
///
/// Substituted values are never rescanned, so document text that happens to
/// contain a placeholder is passed through verbatim. Unknown braces are kept.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let hit = vars.iter().find_map(|(key, value)| {
            after
                .strip_prefix(key)?
                .strip_prefix('}')
                .map(|remaining| (*value, remaining))
        });
        match hit {
            Some((value, remaining)) => {
                out.push_str(value);
                rest = remaining;
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
