//! Per-source selector sets.
//!
//! Site markup churns, so everything board-specific (CSS selectors, id
//! patterns, placeholders, request headers) is data rather than code. Sets
//! are JSON documents carrying a `version` so overrides can be tracked
//! against the markup they were written for.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::JobBoard;

/// Fallback text for fields that come back empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholders {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            title: "Not specified".to_string(),
            company: "Not specified".to_string(),
            location: "Not specified".to_string(),
            description: "Not specified".to_string(),
        }
    }
}

/// CSS selectors and extraction rules for one job board.
///
/// Every field holds an ordered list of selectors: the first one that yields
/// non-empty text wins. A single entry may itself be a selector group
/// (`"a, b"`), in which case the text of all matches is joined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorSet {
    pub version: String,
    pub board: JobBoard,
    /// Origin used to resolve relative detail links.
    pub base_url: String,
    /// Listing page to fetch.
    pub search_url: String,
    /// Locates one element per job card.
    pub card: String,
    /// The card element is the title link itself (title = its text, link = its href).
    #[serde(default)]
    pub card_is_link: bool,
    /// Ancestor of the card to read the remaining fields from.
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub title: Vec<String>,
    #[serde(default)]
    pub company: Vec<String>,
    #[serde(default)]
    pub location: Vec<String>,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub salary: Vec<String>,
    #[serde(default)]
    pub link: Vec<String>,
    /// When no description selector matches, use the card text cut to this many chars.
    #[serde(default)]
    pub description_from_card: Option<usize>,
    /// Strict native-id pattern applied to the detail URL; capture group 1 is the id.
    #[serde(default)]
    pub id_pattern: Option<String>,
    /// Skip cards whose title is empty instead of using the placeholder.
    #[serde(default)]
    pub require_title: bool,
    #[serde(default)]
    pub placeholders: Placeholders,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

impl SelectorSet {
    /// Parse a single selector set from JSON.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let set: SelectorSet = serde_json::from_str(raw)
            .map_err(|e| AppError::ConfigError(format!("Invalid selector set: {e}")))?;
        set.validate()?;
        Ok(set)
    }

    /// Load a JSON array of selector sets from disk.
    pub fn load_file(path: &Path) -> Result<Vec<Self>, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!(
                "Failed to read selector file {}: {e}",
                path.display()
            ))
        })?;
        let sets: Vec<SelectorSet> = serde_json::from_str(&raw).map_err(|e| {
            AppError::ConfigError(format!(
                "Invalid selector file {}: {e}",
                path.display()
            ))
        })?;
        for set in &sets {
            set.validate()?;
        }
        Ok(sets)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.card.trim().is_empty() {
            return Err(AppError::ConfigError(format!(
                "Selector set for {} has an empty card selector",
                self.board
            )));
        }
        if self.search_url.trim().is_empty() || self.base_url.trim().is_empty() {
            return Err(AppError::ConfigError(format!(
                "Selector set for {} needs both base_url and search_url",
                self.board
            )));
        }
        Ok(())
    }
}
