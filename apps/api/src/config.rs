use std::num::NonZeroUsize;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_BATCH_SIZE: usize = 10;
const DEFAULT_BATCH_TIMEOUT_SECS: u64 = 180;
const DEFAULT_HISTORY_CAP: usize = 20;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
/// Bulk uploads carry every resume inline as a base64 data URI.
const DEFAULT_MAX_REQUEST_BYTES: usize = 50 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL for screening history. Unset means in-memory history.
    pub database_url: Option<String>,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Maximum resumes per ranking batch.
    pub batch_size: NonZeroUsize,
    /// Upper bound on a single batch's ranking call.
    pub batch_timeout: Duration,
    /// Screening results kept per job role before the oldest are evicted.
    pub history_cap: usize,
    pub llm_timeout: Duration,
    /// Body size limit for the bulk ranking route.
    pub max_request_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let batch_size: usize = parse_or(&lookup, "RANKING_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        let Some(batch_size) = NonZeroUsize::new(batch_size) else {
            bail!("RANKING_BATCH_SIZE must be greater than zero");
        };

        Ok(Config {
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            anthropic_api_key: lookup("ANTHROPIC_API_KEY").with_context(|| {
                "Required environment variable 'ANTHROPIC_API_KEY' is not set".to_string()
            })?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            batch_size,
            batch_timeout: Duration::from_secs(parse_or(
                &lookup,
                "RANKING_BATCH_TIMEOUT_SECS",
                DEFAULT_BATCH_TIMEOUT_SECS,
            )?),
            history_cap: parse_or(&lookup, "SCREENING_HISTORY_CAP", DEFAULT_HISTORY_CAP)?,
            llm_timeout: Duration::from_secs(parse_or(
                &lookup,
                "LLM_REQUEST_TIMEOUT_SECS",
                DEFAULT_LLM_TIMEOUT_SECS,
            )?),
            max_request_bytes: parse_or(&lookup, "MAX_REQUEST_BYTES", DEFAULT_MAX_REQUEST_BYTES)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied_when_only_api_key_set() {
        let config = Config::from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.batch_size.get(), 10);
        assert_eq!(config.port, 8080);
        assert_eq!(config.history_cap, 20);
        assert_eq!(config.batch_timeout, Duration::from_secs(180));
        assert!(config.database_url.is_none());
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.max_request_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("RANKING_BATCH_SIZE", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("RANKING_BATCH_SIZE"));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("PORT", "not-a-port"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("RANKING_BATCH_SIZE", "4"),
            ("RANKING_BATCH_TIMEOUT_SECS", "30"),
            ("SCREENING_HISTORY_CAP", "5"),
            ("DATABASE_URL", "postgres://localhost/screener"),
            ("MAX_REQUEST_BYTES", "1048576"),
        ]))
        .unwrap();
        assert_eq!(config.max_request_bytes, 1_048_576);
        assert_eq!(config.batch_size.get(), 4);
        assert_eq!(config.batch_timeout, Duration::from_secs(30));
        assert_eq!(config.history_cap, 5);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/screener")
        );
    }

    #[test]
    fn test_blank_database_url_treated_as_unset() {
        let config = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("DATABASE_URL", "  "),
        ]))
        .unwrap();
        assert!(config.database_url.is_none());
    }
}
