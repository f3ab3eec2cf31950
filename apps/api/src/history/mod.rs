//! Screening history — finished screenings grouped by job role, with a
//! bounded number of results kept per role (oldest evicted first).
//!
//! `AppState` holds an `Arc<dyn ScreeningStore>`: Postgres when
//! `DATABASE_URL` is configured, in-memory otherwise.

pub mod handlers;
pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::screening::JobScreeningResult;

#[async_trait]
pub trait ScreeningStore: Send + Sync {
    /// Persists `result` and evicts the oldest results for its job role
    /// beyond the store's cap.
    async fn save(&self, result: JobScreeningResult) -> Result<JobScreeningResult, AppError>;

    /// Results for `job_role`, newest first.
    async fn list(&self, job_role: &str) -> Result<Vec<JobScreeningResult>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<JobScreeningResult>, AppError>;
}

/// Process-local store. Contents are lost on restart.
pub struct InMemoryScreeningStore {
    cap: usize,
    /// Per role, oldest first.
    by_role: RwLock<HashMap<String, Vec<JobScreeningResult>>>,
}

impl InMemoryScreeningStore {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            by_role: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ScreeningStore for InMemoryScreeningStore {
    async fn save(&self, result: JobScreeningResult) -> Result<JobScreeningResult, AppError> {
        let mut by_role = self.by_role.write().await;
        let history = by_role.entry(result.job_role.clone()).or_default();
        history.push(result.clone());
        history.sort_by_key(|r| r.created_at);

        let overflow = history.len().saturating_sub(self.cap);
        if overflow > 0 {
            history.drain(..overflow);
            tracing::debug!(job_role = %result.job_role, evicted = overflow, "Evicted old screenings");
        }

        Ok(result)
    }

    async fn list(&self, job_role: &str) -> Result<Vec<JobScreeningResult>, AppError> {
        let by_role = self.by_role.read().await;
        Ok(by_role
            .get(job_role)
            .map(|history| history.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobScreeningResult>, AppError> {
        let by_role = self.by_role.read().await;
        Ok(by_role.values().flatten().find(|r| r.id == id).cloned())
    }
}
