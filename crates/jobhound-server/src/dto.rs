use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobhound_core::models::{JobRecord, JobSearch, SavedJob};

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct JobResponse {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub salary: Option<String>,
    pub source_url: String,
    pub job_board: String,
    pub scraped_at: DateTime<Utc>,
}

impl From<JobRecord> for JobResponse {
    fn from(job: JobRecord) -> Self {
        Self {
            id: job.id,
            title: job.title,
            company: job.company,
            location: job.location,
            description: job.description,
            salary: job.salary,
            source_url: job.source_url,
            job_board: job.source_board.to_string(),
            scraped_at: job.scraped_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive partial match on the title.
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
}

impl From<SearchQuery> for JobSearch {
    fn from(query: SearchQuery) -> Self {
        Self {
            keyword: query.keyword,
            location: query.location,
            company: query.company,
        }
    }
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MockQuery {
    /// Number of records to generate (default 10, at most 1000).
    pub count: Option<usize>,
}

// ---------------------------------------------------------------------------
// Saved jobs
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SavedJobResponse {
    pub id: i64,
    pub job: JobResponse,
    pub saved_at: DateTime<Utc>,
    pub applied: bool,
    pub applied_at: Option<DateTime<Utc>>,
}

impl From<SavedJob> for SavedJobResponse {
    fn from(saved: SavedJob) -> Self {
        Self {
            id: saved.id,
            job: saved.job.into(),
            saved_at: saved.saved_at,
            applied: saved.applied,
            applied_at: saved.applied_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SaveJobQuery {
    pub job_id: String,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SavedJobsQuery {
    #[serde(default)]
    pub applied_only: bool,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
