use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};

use jobhound_core::error::AppError;
use jobhound_core::models::{JobBoard, JobRecord, JobSearch};
use jobhound_core::traits::{ExistenceCheck, JobStore};

/// Rows per multi-row INSERT; 9 binds each keeps well under the Postgres bind limit.
const INSERT_CHUNK: usize = 500;

const JOB_COLUMNS: &str =
    "id, title, company, location, description, salary, source_url, source_board, scraped_at";

/// PostgreSQL-backed job storage keyed by the record id.
#[derive(Clone)]
pub struct JobRepository {
    pool: Pool<Postgres>,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All stored jobs, most recently scraped first.
    pub async fn list_all(&self) -> Result<Vec<JobRecord>, AppError> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs ORDER BY scraped_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(JobRecord::try_from).collect()
    }

    /// Case-insensitive partial match; blank or missing filters match everything.
    pub async fn search(&self, search: &JobSearch) -> Result<Vec<JobRecord>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {JOB_COLUMNS} FROM jobs WHERE TRUE"));

        let filters = [
            ("title", search.keyword.as_deref()),
            ("location", search.location.as_deref()),
            ("company", search.company.as_deref()),
        ];
        for (column, term) in filters {
            if let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) {
                builder
                    .push(format!(" AND {column} ILIKE "))
                    .push_bind(like_pattern(term));
            }
        }
        builder.push(" ORDER BY scraped_at DESC, id");

        let rows = builder
            .build_query_as::<JobRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(JobRecord::try_from).collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<JobRecord>, AppError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        row.map(JobRecord::try_from).transpose()
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl ExistenceCheck for JobRepository {
    async fn exists_any(&self, ids: &HashSet<String>) -> Result<HashSet<String>, AppError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();

        let rows: Vec<(String,)> = sqlx::query_as("SELECT id FROM jobs WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

impl JobStore for JobRepository {
    async fn insert_jobs(&self, jobs: &[JobRecord]) -> Result<u64, AppError> {
        let mut written = 0;
        for chunk in jobs.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO jobs ({JOB_COLUMNS}) "));
            builder.push_values(chunk, |mut row, job| {
                row.push_bind(&job.id)
                    .push_bind(&job.title)
                    .push_bind(&job.company)
                    .push_bind(&job.location)
                    .push_bind(&job.description)
                    .push_bind(&job.salary)
                    .push_bind(&job.source_url)
                    .push_bind(job.source_board.as_str())
                    .push_bind(job.scraped_at);
            });
            builder.push(" ON CONFLICT (id) DO NOTHING");

            let result = builder
                .build()
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;
            written += result.rows_affected();
        }

        tracing::debug!(attempted = jobs.len(), written, "Inserted jobs");
        Ok(written)
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
pub(crate) struct JobRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) company: String,
    pub(crate) location: String,
    pub(crate) description: String,
    pub(crate) salary: Option<String>,
    pub(crate) source_url: String,
    pub(crate) source_board: String,
    pub(crate) scraped_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for JobRecord {
    type Error = AppError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let source_board: JobBoard = row
            .source_board
            .parse()
            .map_err(|e: String| AppError::DatabaseError(format!("Job {}: {e}", row.id)))?;

        Ok(JobRecord {
            id: row.id,
            title: row.title,
            company: row.company,
            location: row.location,
            description: row.description,
            salary: row.salary,
            source_url: row.source_url,
            source_board,
            scraped_at: row.scraped_at,
        })
    }
}
