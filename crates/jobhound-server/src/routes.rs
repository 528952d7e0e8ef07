use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use jobhound_core::export::write_applied_csv;
use jobhound_core::mock::DEFAULT_MOCK_COUNT;
use jobhound_core::trigger::{BatchOutcome, MockBatch};

use crate::auth::{Owner, require_api_key};
use crate::dto::{
    HealthResponse, JobResponse, MockQuery, SaveJobQuery, SavedJobResponse, SavedJobsQuery,
    SearchQuery,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/jobs", get(list_jobs))
        .route("/api/jobs/search", get(search_jobs))
        .route("/api/jobs/scrape", post(scrape_jobs))
        .route("/api/jobs/scrape-mock", post(scrape_mock))
        .route("/api/saved-jobs", get(list_saved).post(save_job))
        .route("/api/saved-jobs/export", get(export_applied))
        .route("/api/saved-jobs/{id}/apply", put(mark_applied))
        .route("/api/saved-jobs/{id}", axum::routing::delete(delete_saved))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    let public = Router::new()
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public.merge(api).with_state(state)
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/jobs",
    responses(
        (status = 200, description = "All stored jobs, newest first", body = Vec<JobResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "jobs"
)]
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
) -> Result<axum::Json<Vec<JobResponse>>, ApiError> {
    let jobs = state.db.jobs().list_all().await?;
    Ok(axum::Json(jobs.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/jobs/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching jobs", body = Vec<JobResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "jobs"
)]
pub async fn search_jobs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<axum::Json<Vec<JobResponse>>, ApiError> {
    let jobs = state.db.jobs().search(&query.into()).await?;
    Ok(axum::Json(jobs.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Scraping
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/jobs/scrape",
    responses(
        (status = 200, description = "Batch finished (saved counts, or no jobs found)", body = String),
        (status = 408, description = "Still running; results are saved once complete", body = String),
        (status = 409, description = "Another scrape batch is already running", body = String),
        (status = 504, description = "Deadline passed before any source returned jobs", body = String),
        (status = 500, description = "Batch failed", body = String),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "scrape"
)]
pub async fn scrape_jobs(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let outcome = state.trigger.run_bounded(state.wait).await;
    let status = match outcome {
        BatchOutcome::Completed { .. } | BatchOutcome::NoJobs => StatusCode::OK,
        BatchOutcome::TimedOut { .. } => StatusCode::REQUEST_TIMEOUT,
        BatchOutcome::AlreadyRunning => StatusCode::CONFLICT,
        BatchOutcome::DeadlineExceeded { .. } => StatusCode::GATEWAY_TIMEOUT,
        BatchOutcome::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, outcome.to_string())
}

#[utoipa::path(
    post,
    path = "/api/jobs/scrape-mock",
    params(MockQuery),
    responses(
        (status = 202, description = "Mock batch started", body = String),
        (status = 400, description = "Count above the allowed maximum", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "scrape"
)]
pub async fn scrape_mock(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MockQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let batch = state
        .trigger
        .spawn_mock(query.count.unwrap_or(DEFAULT_MOCK_COUNT))?;

    tokio::spawn(async move {
        match batch.wait().await {
            Ok(summary) => tracing::info!(
                saved = summary.saved,
                duplicates = summary.duplicates,
                "Mock scraping completed"
            ),
            Err(e) => tracing::error!(error = %e, "Mock scraping failed"),
        }
    });

    Ok((StatusCode::ACCEPTED, MockBatch::ACK))
}

// ---------------------------------------------------------------------------
// Saved jobs
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/saved-jobs",
    params(SavedJobsQuery, ("x-user" = String, Header, description = "Owner of the saved jobs")),
    responses(
        (status = 200, description = "Saved jobs for the caller", body = Vec<SavedJobResponse>),
        (status = 400, description = "Missing X-User header", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "saved-jobs"
)]
pub async fn list_saved(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Query(query): Query<SavedJobsQuery>,
) -> Result<axum::Json<Vec<SavedJobResponse>>, ApiError> {
    let saved = state
        .db
        .saved_jobs()
        .list(&owner, query.applied_only)
        .await?;
    Ok(axum::Json(saved.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/saved-jobs",
    params(SaveJobQuery, ("x-user" = String, Header, description = "Owner of the saved jobs")),
    responses(
        (status = 200, description = "Saved (or already saved) job", body = SavedJobResponse),
        (status = 404, description = "Job not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "saved-jobs"
)]
pub async fn save_job(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Query(query): Query<SaveJobQuery>,
) -> Result<axum::Json<SavedJobResponse>, ApiError> {
    let saved = state.db.saved_jobs().save(&owner, &query.job_id).await?;
    Ok(axum::Json(saved.into()))
}

#[utoipa::path(
    put,
    path = "/api/saved-jobs/{id}/apply",
    params(("id" = i64, Path, description = "Saved job ID"), ("x-user" = String, Header, description = "Owner of the saved jobs")),
    responses(
        (status = 200, description = "Marked as applied", body = SavedJobResponse),
        (status = 404, description = "Saved job not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "saved-jobs"
)]
pub async fn mark_applied(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<i64>,
) -> Result<axum::Json<SavedJobResponse>, ApiError> {
    let saved = state.db.saved_jobs().mark_applied(&owner, id).await?;
    Ok(axum::Json(saved.into()))
}

#[utoipa::path(
    delete,
    path = "/api/saved-jobs/{id}",
    params(("id" = i64, Path, description = "Saved job ID"), ("x-user" = String, Header, description = "Owner of the saved jobs")),
    responses(
        (status = 204, description = "Removed"),
        (status = 404, description = "Saved job not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "saved-jobs"
)]
pub async fn delete_saved(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.saved_jobs().delete(&owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/saved-jobs/export",
    params(("x-user" = String, Header, description = "Owner of the saved jobs")),
    responses(
        (status = 200, description = "Applied jobs as CSV", content_type = "text/csv", body = String),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "saved-jobs"
)]
pub async fn export_applied(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
) -> Result<impl IntoResponse, ApiError> {
    let applied = state.db.saved_jobs().applied(&owner).await?;
    let mut csv = Vec::new();
    write_applied_csv(&applied, &mut csv)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"applied_jobs.csv\"",
            ),
        ],
        csv,
    ))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let healthy = state.db.jobs().health_check().await.is_ok();

    let (status, response) = if healthy {
        (
            StatusCode::OK,
            HealthResponse {
                status: "healthy",
                database: "ok",
            },
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse {
                status: "unhealthy",
                database: "error",
            },
        )
    };

    (status, axum::Json(response))
}
