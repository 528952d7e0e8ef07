//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use crate::error::{AppError, FetchError};
use crate::models::{JobBoard, JobRecord};
use crate::scrape::Source;
use crate::traits::{ExistenceCheck, Extractor, FetchRequest, Fetcher, JobStore};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum MockResponse {
    Html(String),
    Delayed(Duration, String),
    Error(FetchError),
    Hang,
}

/// Mock fetcher answering per URL. Unknown URLs get an HTTP 404.
#[derive(Clone, Default)]
pub struct MockFetcher {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(self, url: &str, response: MockResponse) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
        self
    }

    pub fn respond(self, url: &str, html: &str) -> Self {
        self.with(url, MockResponse::Html(html.to_string()))
    }

    pub fn respond_after(self, url: &str, delay: Duration, html: &str) -> Self {
        self.with(url, MockResponse::Delayed(delay, html.to_string()))
    }

    pub fn fail(self, url: &str, error: FetchError) -> Self {
        self.with(url, MockResponse::Error(error))
    }

    /// The request never completes.
    pub fn hang(self, url: &str) -> Self {
        self.with(url, MockResponse::Hang)
    }

    /// URLs requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(request.url.clone());
        let response = self.responses.lock().unwrap().get(&request.url).cloned();

        match response {
            Some(MockResponse::Html(html)) => Ok(html),
            Some(MockResponse::Delayed(delay, html)) => {
                tokio::time::sleep(delay).await;
                Ok(html)
            }
            Some(MockResponse::Error(e)) => Err(e),
            Some(MockResponse::Hang) => std::future::pending().await,
            None => Err(FetchError::HttpStatus {
                code: 404,
                url: request.url.clone(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MockExtractor
// ---------------------------------------------------------------------------

/// Mock extractor: one record per non-empty markup line, id `<prefix>-<line>`.
#[derive(Clone)]
pub struct MockExtractor {
    prefix: String,
    panics: bool,
}

impl MockExtractor {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            panics: false,
        }
    }

    /// An extractor that blows up on any input.
    pub fn panicking() -> Self {
        Self {
            prefix: String::new(),
            panics: true,
        }
    }
}

impl Extractor for MockExtractor {
    fn extract(&self, markup: &str) -> Vec<JobRecord> {
        if self.panics {
            panic!("malformed markup");
        }
        markup
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| make_record(&format!("{}-{}", self.prefix, line)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

/// In-memory store recording existence checks and inserts.
#[derive(Clone, Default)]
pub struct MockStore {
    known: Arc<Mutex<HashSet<String>>>,
    pub inserted: Arc<Mutex<Vec<JobRecord>>>,
    pub existence_calls: Arc<Mutex<usize>>,
    check_error: Arc<Mutex<Option<AppError>>>,
    insert_error: Arc<Mutex<Option<AppError>>>,
}

impl MockStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store that already holds the given ids.
    pub fn with_known(ids: &[&str]) -> Self {
        let store = Self::default();
        store
            .known
            .lock()
            .unwrap()
            .extend(ids.iter().map(|id| id.to_string()));
        store
    }

    pub fn with_check_error(error: AppError) -> Self {
        let store = Self::default();
        *store.check_error.lock().unwrap() = Some(error);
        store
    }

    pub fn with_insert_error(error: AppError) -> Self {
        let store = Self::default();
        *store.insert_error.lock().unwrap() = Some(error);
        store
    }

    pub fn inserted_ids(&self) -> Vec<String> {
        self.inserted
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.id.clone())
            .collect()
    }
}

impl ExistenceCheck for MockStore {
    async fn exists_any(&self, ids: &HashSet<String>) -> Result<HashSet<String>, AppError> {
        *self.existence_calls.lock().unwrap() += 1;
        if let Some(e) = self.check_error.lock().unwrap().take() {
            return Err(e);
        }
        let known = self.known.lock().unwrap();
        Ok(ids.intersection(&known).cloned().collect())
    }
}

impl JobStore for MockStore {
    async fn insert_jobs(&self, jobs: &[JobRecord]) -> Result<u64, AppError> {
        if let Some(e) = self.insert_error.lock().unwrap().take() {
            return Err(e);
        }
        let mut known = self.known.lock().unwrap();
        let mut inserted = self.inserted.lock().unwrap();
        let mut written = 0;
        for job in jobs {
            if known.insert(job.id.clone()) {
                inserted.push(job.clone());
                written += 1;
            }
        }
        Ok(written)
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

pub fn make_request(url: &str) -> FetchRequest {
    FetchRequest {
        url: url.to_string(),
        user_agent: "jobhound-test".to_string(),
        headers: vec![],
        timeout: Duration::from_secs(5),
    }
}

/// Source whose records are prefixed with its label.
pub fn make_source(label: &str, url: &str) -> Source<MockExtractor> {
    Source {
        label: label.to_string(),
        request: make_request(url),
        extractor: MockExtractor::new(label),
    }
}

/// Create a dummy JobRecord with the given id.
pub fn make_record(id: &str) -> JobRecord {
    JobRecord {
        id: id.to_string(),
        title: "Rust Engineer".to_string(),
        company: "Example Corp".to_string(),
        location: "Remote".to_string(),
        description: "Build things".to_string(),
        salary: None,
        source_url: format!("https://example.com/jobs/{id}"),
        source_board: JobBoard::Dice,
        scraped_at: Utc::now(),
    }
}
