use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::history::ScreeningStore;
use crate::models::screening::{JobScreeningResult, RankedCandidate};

#[derive(Debug, FromRow)]
struct ScreeningRow {
    id: Uuid,
    job_role: String,
    job_description_name: String,
    candidates: Json<Vec<RankedCandidate>>,
    created_at: DateTime<Utc>,
}

impl From<ScreeningRow> for JobScreeningResult {
    fn from(row: ScreeningRow) -> Self {
        JobScreeningResult {
            id: row.id,
            job_role: row.job_role,
            job_description_name: row.job_description_name,
            candidates: row.candidates.0,
            created_at: row.created_at,
        }
    }
}

/// Postgres-backed history. Candidates are stored as one JSONB document per screening.
pub struct PgScreeningStore {
    pool: PgPool,
    cap: i64,
}

impl PgScreeningStore {
    pub fn new(pool: PgPool, cap: usize) -> Self {
        Self {
            pool,
            cap: i64::try_from(cap).unwrap_or(i64::MAX),
        }
    }
}

#[async_trait]
impl ScreeningStore for PgScreeningStore {
    async fn save(&self, result: JobScreeningResult) -> Result<JobScreeningResult, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO screening_results
                (id, job_role, job_description_name, candidates, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(result.id)
        .bind(&result.job_role)
        .bind(&result.job_description_name)
        .bind(Json(&result.candidates))
        .bind(result.created_at)
        .execute(&mut *tx)
        .await?;

        let evicted = sqlx::query(
            r#"
            DELETE FROM screening_results
            WHERE job_role = $1
              AND id NOT IN (
                  SELECT id FROM screening_results
                  WHERE job_role = $1
                  ORDER BY created_at DESC, id DESC
                  LIMIT $2
              )
            "#,
        )
        .bind(&result.job_role)
        .bind(self.cap)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        if evicted > 0 {
            tracing::debug!(job_role = %result.job_role, evicted, "Evicted old screenings");
        }

        Ok(result)
    }

    async fn list(&self, job_role: &str) -> Result<Vec<JobScreeningResult>, AppError> {
        let rows = sqlx::query_as::<_, ScreeningRow>(
            "SELECT * FROM screening_results WHERE job_role = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(job_role)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(JobScreeningResult::from).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobScreeningResult>, AppError> {
        let row = sqlx::query_as::<_, ScreeningRow>("SELECT * FROM screening_results WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(JobScreeningResult::from))
    }
}
