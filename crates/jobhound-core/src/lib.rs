pub mod config;
pub mod error;
pub mod export;
pub mod mock;
pub mod models;
pub mod reconcile;
pub mod scrape;
pub mod selectors;
pub mod traits;
pub mod trigger;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::ScrapeConfig;
pub use error::{AppError, FetchError};
pub use models::{
    JobBoard, JobRecord, JobSearch, ReconciliationResult, SavedJob, ScrapeOutcome,
};
pub use reconcile::reconcile;
pub use scrape::{ScrapeOrchestrator, Source};
pub use selectors::SelectorSet;
pub use traits::{ExistenceCheck, Extractor, FetchRequest, Fetcher, JobStore};
pub use trigger::{BatchOutcome, BatchSummary, MockBatch, ScrapeTrigger, TriggerConfig};
