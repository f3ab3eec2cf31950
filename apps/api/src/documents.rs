//! Document payloads — resumes and job descriptions arrive as data URIs
//! (`data:<mime>;base64,<payload>`). This module decodes them and extracts
//! plain text for prompt construction.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

/// Characters of extracted text forwarded to the LLM per document.
pub const MAX_DOCUMENT_CHARS: usize = 24_000;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("content is not a data URI")]
    NotDataUri,

    #[error("data URI is missing the ',' separator")]
    MissingSeparator,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid percent-encoding in data URI: {0}")]
    PercentEncoding(#[from] std::string::FromUtf8Error),

    #[error("unsupported document type '{0}'")]
    UnsupportedMime(String),

    #[error("failed to extract PDF text: {0}")]
    Pdf(String),

    #[error("document contains no extractable text")]
    Empty,

    #[error("text extraction task failed: {0}")]
    Extraction(String),
}

/// A decoded data URI.
#[derive(Debug, Clone, PartialEq)]
pub struct DataUri {
    /// Lowercased MIME type, without parameters. Defaults to `text/plain`.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUri {
    pub fn parse(uri: &str) -> Result<Self, DocumentError> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or(DocumentError::NotDataUri)?;
        let (header, payload) = rest.split_once(',').ok_or(DocumentError::MissingSeparator)?;

        let mut parts = header.split(';');
        let mime = parts
            .next()
            .map(|m| m.trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "text/plain".to_string());
        let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));

        let bytes = if is_base64 {
            let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
            BASE64.decode(cleaned.as_bytes())?
        } else {
            urlencoding::decode(payload)?.into_owned().into_bytes()
        };

        Ok(DataUri { mime, bytes })
    }
}

/// Extracts the text of a decoded document, truncated to [`MAX_DOCUMENT_CHARS`].
pub fn extract_text(doc: &DataUri) -> Result<String, DocumentError> {
    let text = match doc.mime.as_str() {
        "application/pdf" => pdf_extract::extract_text_from_mem(&doc.bytes)
            .map_err(|e| DocumentError::Pdf(e.to_string()))?,
        "application/json" => String::from_utf8_lossy(&doc.bytes).into_owned(),
        mime if mime.starts_with("text/") => String::from_utf8_lossy(&doc.bytes).into_owned(),
        other => return Err(DocumentError::UnsupportedMime(other.to_string())),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(DocumentError::Empty);
    }

    Ok(truncate_chars(text, MAX_DOCUMENT_CHARS))
}

/// Convenience: parse a data URI and extract its text in one step.
pub fn text_from_uri(uri: &str) -> Result<String, DocumentError> {
    extract_text(&DataUri::parse(uri)?)
}

/// [`text_from_uri`] on the blocking pool. PDF extraction is CPU-bound.
pub async fn read_text(uri: &str) -> Result<String, DocumentError> {
    let uri = uri.to_string();
    tokio::task::spawn_blocking(move || text_from_uri(&uri))
        .await
        .map_err(|e| DocumentError::Extraction(e.to_string()))?
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base64_text_uri() {
        let uri = format!("data:text/plain;base64,{}", BASE64.encode("Jane Doe, Rust"));
        let doc = DataUri::parse(&uri).unwrap();
        assert_eq!(doc.mime, "text/plain");
        assert_eq!(doc.bytes, b"Jane Doe, Rust");
    }

    #[test]
    fn test_parse_mime_is_lowercased_and_params_ignored() {
        let uri = format!(
            "data:Application/PDF;name=cv.pdf;base64,{}",
            BASE64.encode([0x25, 0x50])
        );
        let doc = DataUri::parse(&uri).unwrap();
        assert_eq!(doc.mime, "application/pdf");
    }

    #[test]
    fn test_parse_percent_encoded_payload() {
        let doc = DataUri::parse("data:,hello%20world").unwrap();
        assert_eq!(doc.mime, "text/plain");
        assert_eq!(doc.bytes, b"hello world");
    }

    #[test]
    fn test_parse_rejects_plain_text() {
        assert!(matches!(
            DataUri::parse("just some text"),
            Err(DocumentError::NotDataUri)
        ));
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(matches!(
            DataUri::parse("data:text/plain;base64"),
            Err(DocumentError::MissingSeparator)
        ));
    }

    #[test]
    fn test_parse_rejects_bad_base64() {
        assert!(matches!(
            DataUri::parse("data:text/plain;base64,@@@"),
            Err(DocumentError::Base64(_))
        ));
    }

    #[test]
    fn test_parse_rejects_percent_escapes_that_are_not_utf8() {
        assert!(matches!(
            DataUri::parse("data:,abc%FF%FE"),
            Err(DocumentError::PercentEncoding(_))
        ));
    }

    #[test]
    fn test_parse_keeps_incomplete_percent_escape_literally() {
        let doc = DataUri::parse("data:,100%2").unwrap();
        assert_eq!(doc.bytes, b"100%2");
    }

    #[tokio::test]
    async fn test_read_text_off_the_async_workers() {
        let uri = format!("data:text/plain;base64,{}", BASE64.encode("Grace Hopper, COBOL"));
        assert_eq!(read_text(&uri).await.unwrap(), "Grace Hopper, COBOL");
        assert!(matches!(
            read_text("data:image/png;base64,iVBORw0=").await,
            Err(DocumentError::UnsupportedMime(_))
        ));
    }

    #[test]
    fn test_extract_text_from_markdown() {
        let doc = DataUri {
            mime: "text/markdown".to_string(),
            bytes: b"  # Senior Engineer\n".to_vec(),
        };
        assert_eq!(extract_text(&doc).unwrap(), "# Senior Engineer");
    }

    #[test]
    fn test_extract_text_rejects_images() {
        let doc = DataUri {
            mime: "image/png".to_string(),
            bytes: vec![0x89, 0x50],
        };
        assert!(matches!(
            extract_text(&doc),
            Err(DocumentError::UnsupportedMime(m)) if m == "image/png"
        ));
    }

    #[test]
    fn test_extract_text_rejects_blank_documents() {
        let doc = DataUri {
            mime: "text/plain".to_string(),
            bytes: b"   \n ".to_vec(),
        };
        assert!(matches!(extract_text(&doc), Err(DocumentError::Empty)));
    }

    #[test]
    fn test_extract_text_truncates_long_documents() {
        let doc = DataUri {
            mime: "text/plain".to_string(),
            bytes: "é".repeat(MAX_DOCUMENT_CHARS + 50).into_bytes(),
        };
        let text = extract_text(&doc).unwrap();
        assert_eq!(text.chars().count(), MAX_DOCUMENT_CHARS);
    }
}
