use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::mock::{check_mock_count, generate_mock};
use crate::models::{JobRecord, ReconciliationResult};
use crate::reconcile::reconcile;
use crate::scrape::ScrapeOrchestrator;
use crate::traits::{Extractor, Fetcher, JobStore};

/// Counts from one completed batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub scraped: usize,
    pub saved: usize,
    pub duplicates: usize,
    pub per_source_errors: BTreeMap<String, String>,
    pub pending_sources: Vec<String>,
}

/// What a trigger call reports back to its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Completed { saved: usize, duplicates: usize },
    NoJobs,
    /// The bounded wait expired; the batch continues in the background.
    TimedOut { wait_secs: u64 },
    /// The orchestrator deadline passed before any source produced records.
    DeadlineExceeded { pending: Vec<String> },
    /// Another batch holds the single-flight guard.
    AlreadyRunning,
    Failed(String),
}

impl fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchOutcome::Completed { saved, duplicates } => write!(
                f,
                "Scraping completed! Saved {saved} new jobs, skipped {duplicates} duplicates."
            ),
            BatchOutcome::NoJobs => write!(f, "Scraping completed but no jobs found."),
            BatchOutcome::TimedOut { wait_secs } => write!(
                f,
                "Scraping is taking longer than expected (>{wait_secs}s). Jobs will be saved once complete."
            ),
            BatchOutcome::DeadlineExceeded { pending } => write!(
                f,
                "Scraping stopped at the deadline before any jobs were found (unfinished: {}).",
                pending.join(", ")
            ),
            BatchOutcome::AlreadyRunning => write!(f, "Scraping is already in progress."),
            BatchOutcome::Failed(message) => write!(f, "Scraping failed: {message}"),
        }
    }
}

impl BatchOutcome {
    fn from_result(result: Result<BatchSummary, AppError>) -> Self {
        match result {
            Ok(summary) if summary.scraped == 0 && !summary.pending_sources.is_empty() => {
                tracing::warn!(
                    pending = ?summary.pending_sources,
                    "Deadline reached before any source returned jobs"
                );
                BatchOutcome::DeadlineExceeded {
                    pending: summary.pending_sources,
                }
            }
            Ok(summary) if summary.scraped == 0 => BatchOutcome::NoJobs,
            Ok(summary) => BatchOutcome::Completed {
                saved: summary.saved,
                duplicates: summary.duplicates,
            },
            Err(e) => {
                tracing::error!(error = %e, "Error during scraping");
                BatchOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Timing knobs for one batch.
#[derive(Debug, Clone)]
pub struct TriggerConfig {
    pub per_source_timeout: Duration,
    pub overall_deadline: Duration,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            per_source_timeout: Duration::from_secs(30),
            overall_deadline: Duration::from_secs(30),
        }
    }
}

/// Reconcile candidates against the store and insert only the new ones.
pub async fn persist_new<S: JobStore>(
    candidates: Vec<JobRecord>,
    store: &S,
) -> Result<ReconciliationResult, AppError> {
    let result = reconcile(candidates, store).await?;
    if !result.new_records.is_empty() {
        store.insert_jobs(&result.new_records).await?;
    }
    tracing::info!(
        saved = result.new_count,
        duplicates = result.duplicate_count,
        "Saved new jobs, skipped duplicates"
    );
    Ok(result)
}

/// Handle to a mock batch running in the background.
#[derive(Debug)]
pub struct MockBatch {
    handle: JoinHandle<Result<BatchSummary, AppError>>,
}

impl MockBatch {
    pub const ACK: &'static str = "Mock job scraping initiated";

    /// Wait for the batch to finish.
    pub async fn wait(self) -> Result<BatchSummary, AppError> {
        self.handle
            .await
            .map_err(|e| AppError::Generic(format!("Mock batch task failed: {e}")))?
    }

    /// Wait up to `limit`; on expiry the batch keeps running detached.
    pub async fn wait_timeout(self, limit: Duration) -> Result<BatchSummary, AppError> {
        match tokio::time::timeout(limit, self.wait()).await {
            Ok(result) => result,
            Err(_) => Err(AppError::BatchTimeout(limit)),
        }
    }
}

/// Generate `count` mock records and persist them in a background task.
///
/// Counts above [`MAX_MOCK_COUNT`](crate::mock::MAX_MOCK_COUNT) are refused
/// before anything is spawned.
pub fn spawn_mock<S: JobStore>(store: S, count: usize) -> Result<MockBatch, AppError> {
    let count = check_mock_count(count)?;
    tracing::info!(count, "Triggering mock job scraping");
    let handle = tokio::spawn(async move {
        let jobs = generate_mock(count);
        let scraped = jobs.len();
        let result = persist_new(jobs, &store).await?;
        Ok(BatchSummary {
            scraped,
            saved: result.new_count,
            duplicates: result.duplicate_count,
            ..BatchSummary::default()
        })
    });
    Ok(MockBatch { handle })
}

/// Clears the running flag when the batch ends, however it ends.
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs scrape → reconcile → persist as one batch.
///
/// At most one batch runs at a time per trigger; a concurrent call fails
/// fast instead of double-writing.
pub struct ScrapeTrigger<F, E, S>
where
    F: Fetcher,
    E: Extractor,
    S: JobStore,
{
    orchestrator: Arc<ScrapeOrchestrator<F, E>>,
    store: S,
    config: TriggerConfig,
    running: Arc<AtomicBool>,
}

impl<F, E, S> Clone for ScrapeTrigger<F, E, S>
where
    F: Fetcher,
    E: Extractor,
    S: JobStore,
{
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            store: self.store.clone(),
            config: self.config.clone(),
            running: Arc::clone(&self.running),
        }
    }
}

impl<F, E, S> ScrapeTrigger<F, E, S>
where
    F: Fetcher,
    E: Extractor,
    S: JobStore,
{
    pub fn new(orchestrator: ScrapeOrchestrator<F, E>, store: S, config: TriggerConfig) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            store,
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn try_acquire(&self) -> Option<RunGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard(Arc::clone(&self.running)))
    }

    /// Run one batch to completion.
    pub async fn run_batch(&self) -> BatchOutcome {
        let Some(_guard) = self.try_acquire() else {
            return BatchOutcome::AlreadyRunning;
        };
        tracing::info!("Triggering job scraping process");
        BatchOutcome::from_result(self.execute().await)
    }

    /// Run one batch, waiting at most `wait` for it.
    ///
    /// If the wait expires the batch keeps going in the background and still
    /// persists its results; its completion is logged.
    pub async fn run_bounded(&self, wait: Duration) -> BatchOutcome {
        let Some(guard) = self.try_acquire() else {
            return BatchOutcome::AlreadyRunning;
        };
        tracing::info!(wait_secs = wait.as_secs(), "Triggering job scraping process");

        let this = self.clone();
        let mut handle = tokio::spawn(async move {
            let _guard = guard;
            this.execute().await
        });

        match tokio::time::timeout(wait, &mut handle).await {
            Ok(Ok(result)) => BatchOutcome::from_result(result),
            Ok(Err(e)) => BatchOutcome::Failed(format!("scrape task failed: {e}")),
            Err(_) => {
                let err = AppError::BatchTimeout(wait);
                tracing::warn!(error = %err, "Continuing scrape in background");
                tokio::spawn(async move {
                    match handle.await {
                        Ok(Ok(summary)) => tracing::info!(
                            saved = summary.saved,
                            duplicates = summary.duplicates,
                            "Background scrape batch finished"
                        ),
                        Ok(Err(e)) => tracing::error!(error = %e, "Background scrape batch failed"),
                        Err(e) => tracing::error!(error = %e, "Background scrape task failed"),
                    }
                });
                BatchOutcome::TimedOut {
                    wait_secs: wait.as_secs(),
                }
            }
        }
    }

    /// Start a mock batch against this trigger's store.
    pub fn spawn_mock(&self, count: usize) -> Result<MockBatch, AppError> {
        spawn_mock(self.store.clone(), count)
    }

    async fn execute(&self) -> Result<BatchSummary, AppError> {
        let outcome = self
            .orchestrator
            .scrape_all(self.config.per_source_timeout, self.config.overall_deadline)
            .await;

        let scraped = outcome.records.len();
        if scraped == 0 {
            return Ok(BatchSummary {
                per_source_errors: outcome.per_source_errors,
                pending_sources: outcome.pending_sources,
                ..BatchSummary::default()
            });
        }

        let result = persist_new(outcome.records, &self.store).await?;
        Ok(BatchSummary {
            scraped,
            saved: result.new_count,
            duplicates: result.duplicate_count,
            per_source_errors: outcome.per_source_errors,
            pending_sources: outcome.pending_sources,
        })
    }
}
