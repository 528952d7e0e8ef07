use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, FetchError};
use crate::models::JobRecord;

/// Everything needed to issue one page request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub user_agent: String,
    pub headers: Vec<(String, String)>,
    /// Hard wall-clock bound on the request.
    pub timeout: Duration,
}

/// Fetches raw HTML content for a source.
pub trait Fetcher: Send + Sync + Clone + 'static {
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Turns a listing page into job records.
///
/// Implementations must not fail on malformed markup: an unexpected document
/// yields an empty vector.
pub trait Extractor: Send + Sync + Clone + 'static {
    fn extract(&self, markup: &str) -> Vec<JobRecord>;
}

/// Answers which ids are already stored, in one round trip.
pub trait ExistenceCheck: Send + Sync {
    fn exists_any(
        &self,
        ids: &HashSet<String>,
    ) -> impl Future<Output = Result<HashSet<String>, AppError>> + Send;
}

/// Persists job records.
pub trait JobStore: ExistenceCheck + Clone + 'static {
    /// Insert records, ignoring id collisions. Returns the number of rows written.
    fn insert_jobs(&self, jobs: &[JobRecord]) -> impl Future<Output = Result<u64, AppError>> + Send;
}
