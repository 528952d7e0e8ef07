use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which listing site produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JobBoard {
    Dice,
    WeWorkRemotely,
    SimplyHired,
    Indeed,
    MockBoard,
}

impl JobBoard {
    pub const LIVE: [JobBoard; 4] = [
        JobBoard::Dice,
        JobBoard::WeWorkRemotely,
        JobBoard::SimplyHired,
        JobBoard::Indeed,
    ];

    /// Label persisted alongside each record.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobBoard::Dice => "Dice",
            JobBoard::WeWorkRemotely => "WeWorkRemotely",
            JobBoard::SimplyHired => "SimplyHired",
            JobBoard::Indeed => "Indeed",
            JobBoard::MockBoard => "MockBoard",
        }
    }

    /// Prefix of every record id produced for this board.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            JobBoard::Dice => "dice",
            JobBoard::WeWorkRemotely => "wwr",
            JobBoard::SimplyHired => "simplyhired",
            JobBoard::Indeed => "indeed",
            JobBoard::MockBoard => "mock",
        }
    }
}

impl fmt::Display for JobBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobBoard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dice" => Ok(JobBoard::Dice),
            "wwr" | "weworkremotely" => Ok(JobBoard::WeWorkRemotely),
            "simplyhired" => Ok(JobBoard::SimplyHired),
            "indeed" => Ok(JobBoard::Indeed),
            "mock" | "mockboard" => Ok(JobBoard::MockBoard),
            _ => Err(format!("Unknown job board: {}", s)),
        }
    }
}

/// A job posting extracted from a listing page (or generated by the mock path).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// `<board prefix>-<native id or random uuid>`
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub salary: Option<String>,
    /// Absolute URL of the listing.
    pub source_url: String,
    pub source_board: JobBoard,
    pub scraped_at: DateTime<Utc>,
}

/// Merged result of one orchestration call.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOutcome {
    /// Records in source configuration order, document order within a source.
    pub records: Vec<JobRecord>,
    /// Error description per failed source label.
    pub per_source_errors: BTreeMap<String, String>,
    /// Sources still running when the deadline elapsed.
    pub pending_sources: Vec<String>,
    pub timed_out: bool,
}

impl ScrapeOutcome {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// New-vs-duplicate partition of a candidate set.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationResult {
    pub new_records: Vec<JobRecord>,
    pub new_count: usize,
    pub duplicate_count: usize,
}

/// A job bookmarked by an owner.
#[derive(Debug, Clone, Serialize)]
pub struct SavedJob {
    pub id: i64,
    pub owner: String,
    pub job: JobRecord,
    pub saved_at: DateTime<Utc>,
    pub applied: bool,
    pub applied_at: Option<DateTime<Utc>>,
}

/// Optional filters for job search. `None` matches everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobSearch {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
}
