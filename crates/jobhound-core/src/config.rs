use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::models::JobBoard;
use crate::trigger::TriggerConfig;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Scrape pipeline settings.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub sources: Vec<JobBoard>,
    pub user_agent: String,
    pub per_source_timeout: Duration,
    pub overall_deadline: Duration,
    /// Bounded wait used by interactive triggers.
    pub wait: Duration,
    /// JSON array of selector sets overriding the built-in presets.
    pub selectors_file: Option<PathBuf>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            sources: vec![JobBoard::Dice],
            user_agent: DEFAULT_USER_AGENT.to_string(),
            per_source_timeout: Duration::from_secs(30),
            overall_deadline: Duration::from_secs(30),
            wait: Duration::from_secs(10),
            selectors_file: None,
        }
    }
}

impl ScrapeConfig {
    /// Read configuration from environment variables.
    ///
    /// - `JOBHOUND_SOURCES` (comma-separated boards, defaults to `dice`)
    /// - `JOBHOUND_USER_AGENT`
    /// - `JOBHOUND_PER_SOURCE_TIMEOUT_SECS` (defaults to 30)
    /// - `JOBHOUND_DEADLINE_SECS` (defaults to 30)
    /// - `JOBHOUND_WAIT_SECS` (defaults to 10)
    /// - `JOBHOUND_SELECTORS_FILE`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<L>(lookup: L) -> Result<Self, AppError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let sources = match lookup("JOBHOUND_SOURCES") {
            None => defaults.sources,
            Some(raw) => parse_sources(&raw)?,
        };

        Ok(Self {
            sources,
            user_agent: lookup("JOBHOUND_USER_AGENT")
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or(defaults.user_agent),
            per_source_timeout: secs(
                &lookup,
                "JOBHOUND_PER_SOURCE_TIMEOUT_SECS",
                defaults.per_source_timeout,
            )?,
            overall_deadline: secs(&lookup, "JOBHOUND_DEADLINE_SECS", defaults.overall_deadline)?,
            wait: secs(&lookup, "JOBHOUND_WAIT_SECS", defaults.wait)?,
            selectors_file: lookup("JOBHOUND_SELECTORS_FILE").map(PathBuf::from),
        })
    }

    pub fn trigger_config(&self) -> TriggerConfig {
        TriggerConfig {
            per_source_timeout: self.per_source_timeout,
            overall_deadline: self.overall_deadline,
        }
    }
}

fn parse_sources(raw: &str) -> Result<Vec<JobBoard>, AppError> {
    let mut boards = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let board: JobBoard = name.parse().map_err(AppError::ConfigError)?;
        if board == JobBoard::MockBoard {
            return Err(AppError::ConfigError(
                "MockBoard is not a scrapable source".into(),
            ));
        }
        if !boards.contains(&board) {
            boards.push(board);
        }
    }
    if boards.is_empty() {
        return Err(AppError::ConfigError(
            "JOBHOUND_SOURCES must name at least one board".into(),
        ));
    }
    Ok(boards)
}

fn secs<L>(lookup: &L, key: &str, default: Duration) -> Result<Duration, AppError>
where
    L: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => {
            let parsed: u64 = raw.trim().parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid {key} '{raw}': must be a positive integer"
                ))
            })?;
            if parsed == 0 {
                return Err(AppError::ConfigError(format!("{key} must be at least 1")));
            }
            Ok(Duration::from_secs(parsed))
        }
    }
}
