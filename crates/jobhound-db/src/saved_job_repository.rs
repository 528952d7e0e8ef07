use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};

use jobhound_core::error::AppError;
use jobhound_core::models::{JobRecord, SavedJob};

use crate::job_repository::JobRow;

const SAVED_JOB_SELECT: &str = r#"
    SELECT s.id AS saved_id, s.owner, s.saved_at, s.applied, s.applied_at,
           j.id, j.title, j.company, j.location, j.description, j.salary,
           j.source_url, j.source_board, j.scraped_at
    FROM saved_jobs s
    JOIN jobs j ON j.id = s.job_id
"#;

/// Per-owner bookmarks of stored jobs.
///
/// Every operation is scoped to an explicit owner; one owner can never see or
/// modify another owner's rows.
#[derive(Clone)]
pub struct SavedJobRepository {
    pool: Pool<Postgres>,
}

impl SavedJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bookmark a job. Saving the same job twice returns the existing row.
    pub async fn save(&self, owner: &str, job_id: &str) -> Result<SavedJob, AppError> {
        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("Job {job_id}")));
        }

        sqlx::query(
            r#"
            INSERT INTO saved_jobs (owner, job_id)
            VALUES ($1, $2)
            ON CONFLICT (owner, job_id) DO NOTHING
            "#,
        )
        .bind(owner)
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let row = sqlx::query_as::<_, SavedJobRow>(&format!(
            "{SAVED_JOB_SELECT} WHERE s.owner = $1 AND s.job_id = $2"
        ))
        .bind(owner)
        .bind(job_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        tracing::info!(owner, job_id, "Saved job");
        row.try_into()
    }

    /// An owner's saved jobs, newest first.
    pub async fn list(&self, owner: &str, applied_only: bool) -> Result<Vec<SavedJob>, AppError> {
        let rows = sqlx::query_as::<_, SavedJobRow>(&format!(
            "{SAVED_JOB_SELECT} WHERE s.owner = $1 AND (NOT $2 OR s.applied) ORDER BY s.saved_at DESC, s.id DESC"
        ))
        .bind(owner)
        .bind(applied_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(SavedJob::try_from).collect()
    }

    pub async fn applied(&self, owner: &str) -> Result<Vec<SavedJob>, AppError> {
        self.list(owner, true).await
    }

    /// Mark a saved job applied. The first application timestamp is kept.
    pub async fn mark_applied(&self, owner: &str, id: i64) -> Result<SavedJob, AppError> {
        let updated: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE saved_jobs
            SET applied = TRUE, applied_at = COALESCE(applied_at, NOW())
            WHERE id = $1 AND owner = $2
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if updated.is_none() {
            return Err(AppError::NotFound(format!("Saved job {id}")));
        }

        let row = sqlx::query_as::<_, SavedJobRow>(&format!("{SAVED_JOB_SELECT} WHERE s.id = $1"))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        row.try_into()
    }

    pub async fn delete(&self, owner: &str, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM saved_jobs WHERE id = $1 AND owner = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Saved job {id}")));
        }
        Ok(())
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct SavedJobRow {
    saved_id: i64,
    owner: String,
    saved_at: DateTime<Utc>,
    applied: bool,
    applied_at: Option<DateTime<Utc>>,
    #[sqlx(flatten)]
    job: JobRow,
}

impl TryFrom<SavedJobRow> for SavedJob {
    type Error = AppError;

    fn try_from(row: SavedJobRow) -> Result<Self, Self::Error> {
        Ok(SavedJob {
            id: row.saved_id,
            owner: row.owner,
            job: JobRecord::try_from(row.job)?,
            saved_at: row.saved_at,
            applied: row.applied,
            applied_at: row.applied_at,
        })
    }
}
