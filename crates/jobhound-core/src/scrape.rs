use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::error::FetchError;
use crate::models::{JobRecord, ScrapeOutcome};
use crate::traits::{Extractor, FetchRequest, Fetcher};

/// One configured source: where its listing page lives and how to read it.
#[derive(Debug, Clone)]
pub struct Source<E: Extractor> {
    pub label: String,
    pub request: FetchRequest,
    pub extractor: E,
}

/// Fans out fetch → extract across all configured sources and merges the results.
///
/// Generic over the fetcher and extractor so tests can run without real HTTP.
#[derive(Clone)]
pub struct ScrapeOrchestrator<F, E>
where
    F: Fetcher,
    E: Extractor,
{
    fetcher: F,
    sources: Vec<Source<E>>,
}

impl<F, E> ScrapeOrchestrator<F, E>
where
    F: Fetcher,
    E: Extractor,
{
    pub fn new(fetcher: F, sources: Vec<Source<E>>) -> Self {
        Self { fetcher, sources }
    }

    pub fn sources(&self) -> &[Source<E>] {
        &self.sources
    }

    /// Scrape every source concurrently.
    ///
    /// A failing source contributes no records and an entry in
    /// `per_source_errors`. Once `overall_deadline` elapses the call returns
    /// with whatever finished; the remaining tasks are detached and their
    /// results dropped. Records are merged in configuration order regardless
    /// of completion order.
    pub async fn scrape_all(
        &self,
        per_source_timeout: Duration,
        overall_deadline: Duration,
    ) -> ScrapeOutcome {
        let started = Instant::now();
        let deadline = started + overall_deadline;
        tracing::info!(
            sources = self.sources.len(),
            "Starting parallel scrape of all sources"
        );

        let mut tasks = JoinSet::new();
        for (index, source) in self.sources.iter().enumerate() {
            let fetcher = self.fetcher.clone();
            let source = source.clone();
            // The inner task isolates panics so the slot index always comes back.
            tasks.spawn(async move {
                let work = tokio::spawn(async move {
                    scrape_source(&fetcher, &source, per_source_timeout).await
                });
                let result = match work.await {
                    Ok(Ok(records)) => Ok(records),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(join_err) => Err(format!("extraction task failed: {join_err}")),
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<Vec<JobRecord>, String>>> =
            (0..self.sources.len()).map(|_| None).collect();
        let mut timed_out = false;

        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((index, result)))) => slots[index] = Some(result),
                Ok(Some(Err(e))) => {
                    tracing::error!(error = %e, "Source wrapper task failed");
                }
                Ok(None) => break,
                Err(_) => {
                    timed_out = true;
                    tasks.detach_all();
                    break;
                }
            }
        }

        let mut outcome = ScrapeOutcome {
            timed_out,
            ..ScrapeOutcome::default()
        };

        for (source, slot) in self.sources.iter().zip(slots) {
            match slot {
                Some(Ok(records)) => {
                    tracing::info!(source = %source.label, count = records.len(), "Source scraped");
                    outcome.records.extend(records);
                }
                Some(Err(error)) => {
                    tracing::warn!(source = %source.label, %error, "Source failed");
                    outcome.per_source_errors.insert(source.label.clone(), error);
                }
                None => {
                    tracing::warn!(source = %source.label, "Source abandoned at deadline");
                    outcome.pending_sources.push(source.label.clone());
                }
            }
        }

        tracing::info!(
            total = outcome.records.len(),
            failed = outcome.per_source_errors.len(),
            pending = outcome.pending_sources.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Total jobs scraped"
        );

        outcome
    }
}

async fn scrape_source<F: Fetcher, E: Extractor>(
    fetcher: &F,
    source: &Source<E>,
    timeout: Duration,
) -> Result<Vec<JobRecord>, FetchError> {
    tracing::info!(source = %source.label, url = %source.request.url, "Scraping source");

    let markup = match tokio::time::timeout(timeout, fetcher.fetch(&source.request)).await {
        Ok(result) => result?,
        Err(_) => return Err(FetchError::Timeout(timeout)),
    };
    tracing::debug!(source = %source.label, bytes = markup.len(), "Fetched listing page");

    Ok(source.extractor.extract(&markup))
}
