//! Built-in selector sets and source assembly.

use jobhound_core::config::ScrapeConfig;
use jobhound_core::error::AppError;
use jobhound_core::models::JobBoard;
use jobhound_core::scrape::Source;
use jobhound_core::selectors::SelectorSet;
use jobhound_core::traits::FetchRequest;

use crate::extractor::HtmlExtractor;

const DICE: &str = include_str!("../selectors/dice.json");
const WEWORKREMOTELY: &str = include_str!("../selectors/weworkremotely.json");
const SIMPLYHIRED: &str = include_str!("../selectors/simplyhired.json");
const INDEED: &str = include_str!("../selectors/indeed.json");

/// The bundled selector set for a live board.
pub fn preset(board: JobBoard) -> Result<SelectorSet, AppError> {
    let raw = match board {
        JobBoard::Dice => DICE,
        JobBoard::WeWorkRemotely => WEWORKREMOTELY,
        JobBoard::SimplyHired => SIMPLYHIRED,
        JobBoard::Indeed => INDEED,
        JobBoard::MockBoard => {
            return Err(AppError::ConfigError(
                "MockBoard has no selector set".into(),
            ));
        }
    };
    SelectorSet::from_json(raw)
}

/// Build one source per configured board.
///
/// Sets from `JOBHOUND_SELECTORS_FILE` replace the bundled preset for their
/// board; the rest fall back to the presets.
pub fn build_sources(config: &ScrapeConfig) -> Result<Vec<Source<HtmlExtractor>>, AppError> {
    let overrides = match &config.selectors_file {
        Some(path) => SelectorSet::load_file(path)?,
        None => Vec::new(),
    };

    config
        .sources
        .iter()
        .map(|&board| {
            let set = match overrides.iter().find(|s| s.board == board) {
                Some(set) => {
                    tracing::info!(%board, version = %set.version, "Using selector override");
                    set.clone()
                }
                None => preset(board)?,
            };
            source_for(set, config)
        })
        .collect()
}

fn source_for(set: SelectorSet, config: &ScrapeConfig) -> Result<Source<HtmlExtractor>, AppError> {
    let request = FetchRequest {
        url: set.search_url.clone(),
        user_agent: config.user_agent.clone(),
        headers: set.headers.clone(),
        timeout: config.per_source_timeout,
    };
    let label = set.board.as_str().to_string();
    Ok(Source {
        label,
        request,
        extractor: HtmlExtractor::new(set)?,
    })
}
