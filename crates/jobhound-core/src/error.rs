use std::time::Duration;

use thiserror::Error;

/// Failure of a single page fetch.
///
/// Always scoped to one source: the orchestrator records it and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not finish within its wall-clock bound.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-2xx status.
    #[error("HTTP {code} for {url}")]
    HttpStatus { code: u16, url: String },

    /// DNS, connect, TLS or reset failures.
    #[error("Network error: {0}")]
    Network(String),

    /// The URL was refused before any request was sent.
    #[error("Blocked URL: {0}")]
    Blocked(String),

    /// The request itself could not be built (bad user agent or header).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// Returns true if this error is transient and worth retrying by the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout(_) | FetchError::Network(_) => true,
            FetchError::HttpStatus { code, .. } => *code == 429 || *code >= 500,
            FetchError::Blocked(_) | FetchError::InvalidRequest(_) => false,
        }
    }
}

/// Application-wide error types for jobhound.
#[derive(Error, Debug)]
pub enum AppError {
    /// Fetching a source page failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A scrape batch did not finish within the bounded wait.
    #[error("Scrape batch still running after {0:?}")]
    BatchTimeout(Duration),

    /// Invalid configuration (env vars, selector sets, patterns).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A caller-supplied value is out of range.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// CSV encoding failed.
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::CsvError(err.to_string())
    }
}
