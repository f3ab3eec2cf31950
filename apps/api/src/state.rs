use std::sync::Arc;

use crate::config::Config;
use crate::history::ScreeningStore;
use crate::llm_client::LlmClient;
use crate::screening::ranker::ResumeRanker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub config: Config,
    /// Pluggable batch ranker. Default: LlmResumeRanker.
    pub ranker: Arc<dyn ResumeRanker>,
    /// Screening history. Postgres when DATABASE_URL is set, in-memory otherwise.
    pub store: Arc<dyn ScreeningStore>,
}

#[cfg(test)]
pub fn test_state(ranker: Arc<dyn ResumeRanker>) -> AppState {
    let config = Config::from_lookup(|key| match key {
        "ANTHROPIC_API_KEY" => Some("sk-test".to_string()),
        "SCREENING_HISTORY_CAP" => Some("3".to_string()),
        _ => None,
    })
    .unwrap();

    AppState {
        llm: LlmClient::new(config.anthropic_api_key.clone(), config.llm_timeout).unwrap(),
        store: Arc::new(crate::history::InMemoryScreeningStore::new(config.history_cap)),
        config,
        ranker,
    }
}
