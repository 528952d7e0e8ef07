use std::time::Duration;

use jobhound_client::{HtmlExtractor, ReqwestFetcher, build_sources};
use jobhound_core::config::ScrapeConfig;
use jobhound_core::error::AppError;
use jobhound_core::scrape::{ScrapeOrchestrator, Source};
use jobhound_core::trigger::ScrapeTrigger;
use jobhound_db::{Database, JobRepository};

pub type LiveTrigger = ScrapeTrigger<ReqwestFetcher, HtmlExtractor, JobRepository>;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    pub trigger: LiveTrigger,
    /// How long `POST /api/jobs/scrape` waits before answering "still running".
    pub wait: Duration,
    pub api_key: String,
}

impl AppState {
    /// Wire the scrape trigger for the configured boards.
    pub fn from_config(
        db: Database,
        config: &ScrapeConfig,
        fetcher: ReqwestFetcher,
        api_key: String,
    ) -> Result<Self, AppError> {
        let sources = build_sources(config)?;
        Ok(Self::with_sources(db, config, fetcher, sources, api_key))
    }

    pub fn with_sources(
        db: Database,
        config: &ScrapeConfig,
        fetcher: ReqwestFetcher,
        sources: Vec<Source<HtmlExtractor>>,
        api_key: String,
    ) -> Self {
        let orchestrator = ScrapeOrchestrator::new(fetcher, sources);
        let trigger = ScrapeTrigger::new(orchestrator, db.jobs(), config.trigger_config());
        Self {
            db,
            trigger,
            wait: config.wait,
            api_key,
        }
    }
}
