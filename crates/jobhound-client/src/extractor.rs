use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use jobhound_core::error::AppError;
use jobhound_core::models::{JobBoard, JobRecord};
use jobhound_core::selectors::{Placeholders, SelectorSet};
use jobhound_core::traits::Extractor;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;
use uuid::Uuid;

static LOOSE_UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("static pattern")
});

/// Selector-driven HTML extractor for one job board.
///
/// Built once from a [`SelectorSet`]; selectors and id patterns are compiled
/// up front so a bad set fails at startup rather than on every page.
#[derive(Clone)]
pub struct HtmlExtractor {
    inner: Arc<Compiled>,
}

struct Compiled {
    board: JobBoard,
    version: String,
    base_url: Url,
    listing_url: String,
    card: Selector,
    card_is_link: bool,
    container: Option<Selector>,
    title: Vec<Selector>,
    company: Vec<Selector>,
    location: Vec<Selector>,
    description: Vec<Selector>,
    salary: Vec<Selector>,
    link: Vec<Selector>,
    description_from_card: Option<usize>,
    id_pattern: Option<Regex>,
    require_title: bool,
    placeholders: Placeholders,
}

#[derive(Debug)]
enum CardSkip {
    MissingTitle,
}

fn compile(board: JobBoard, raw: &str) -> Result<Selector, AppError> {
    Selector::parse(raw).map_err(|e| {
        AppError::ConfigError(format!("Invalid selector '{raw}' for {board}: {e}"))
    })
}

fn compile_all(board: JobBoard, raw: &[String]) -> Result<Vec<Selector>, AppError> {
    raw.iter().map(|s| compile(board, s)).collect()
}

/// Element text with runs of whitespace collapsed to single spaces.
fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First selector in the list that yields non-empty text within `scope`.
///
/// All matches of the winning selector are joined with a space.
fn first_text(scope: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        let text = scope
            .select(selector)
            .map(normalized_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!text.is_empty()).then_some(text)
    })
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    value.unwrap_or_else(|| placeholder.to_string())
}

impl HtmlExtractor {
    pub fn new(set: SelectorSet) -> Result<Self, AppError> {
        let board = set.board;
        let base_url = Url::parse(&set.base_url).map_err(|e| {
            AppError::ConfigError(format!("Invalid base_url '{}' for {board}: {e}", set.base_url))
        })?;
        let id_pattern = set
            .id_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| AppError::ConfigError(format!("Invalid id_pattern for {board}: {e}")))?;

        let compiled = Compiled {
            board,
            version: set.version,
            base_url,
            listing_url: set.search_url,
            card: compile(board, &set.card)?,
            card_is_link: set.card_is_link,
            container: set
                .container
                .as_deref()
                .map(|c| compile(board, c))
                .transpose()?,
            title: compile_all(board, &set.title)?,
            company: compile_all(board, &set.company)?,
            location: compile_all(board, &set.location)?,
            description: compile_all(board, &set.description)?,
            salary: compile_all(board, &set.salary)?,
            link: compile_all(board, &set.link)?,
            description_from_card: set.description_from_card,
            id_pattern,
            require_title: set.require_title,
            placeholders: set.placeholders,
        };

        Ok(Self {
            inner: Arc::new(compiled),
        })
    }

    pub fn board(&self) -> JobBoard {
        self.inner.board
    }

    pub fn version(&self) -> &str {
        &self.inner.version
    }
}

impl Compiled {
    /// The element other fields are read from: the nearest matching ancestor,
    /// or the card itself when there is none.
    fn scope<'a>(&self, card: ElementRef<'a>) -> ElementRef<'a> {
        let Some(container) = &self.container else {
            return card;
        };
        match card
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| container.matches(el))
        {
            Some(found) => found,
            None => {
                tracing::warn!(board = %self.board, "Card has no container ancestor, reading fields from the card");
                card
            }
        }
    }

    fn detail_href<'a>(&self, card: ElementRef<'a>, scope: ElementRef<'a>) -> Option<&'a str> {
        if self.card_is_link {
            if let Some(href) = card
                .value()
                .attr("href")
                .filter(|href| !href.trim().is_empty())
            {
                return Some(href);
            }
        }
        self.link.iter().find_map(|selector| {
            scope
                .select(selector)
                .find_map(|el| el.value().attr("href"))
                .filter(|href| !href.trim().is_empty())
        })
    }

    /// `<prefix>-<native id>` from the detail URL, else a fresh UUID.
    fn record_id(&self, detail_url: Option<&str>) -> String {
        let prefix = self.board.id_prefix();
        let native = detail_url.and_then(|url| {
            self.id_pattern
                .as_ref()
                .and_then(|re| re.captures(url))
                .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
                .map(|m| m.as_str().to_string())
                .or_else(|| LOOSE_UUID.find(url).map(|m| m.as_str().to_lowercase()))
        });
        match native {
            Some(id) => format!("{prefix}-{id}"),
            None => format!("{prefix}-{}", Uuid::new_v4()),
        }
    }

    fn read_card(
        &self,
        card: ElementRef<'_>,
        scraped_at: DateTime<Utc>,
    ) -> Result<JobRecord, CardSkip> {
        let scope = self.scope(card);

        let title = self
            .card_is_link
            .then(|| normalized_text(card))
            .filter(|t| !t.is_empty())
            .or_else(|| first_text(scope, &self.title));
        if title.is_none() && self.require_title {
            return Err(CardSkip::MissingTitle);
        }

        let description = first_text(scope, &self.description).or_else(|| {
            self.description_from_card.and_then(|limit| {
                let text: String = normalized_text(scope).chars().take(limit).collect();
                let text = text.trim_end().to_string();
                (!text.is_empty()).then_some(text)
            })
        });

        let detail_url = self
            .detail_href(card, scope)
            .and_then(|href| self.base_url.join(href.trim()).ok())
            .map(String::from);

        let placeholders = &self.placeholders;
        Ok(JobRecord {
            id: self.record_id(detail_url.as_deref()),
            title: or_placeholder(title, &placeholders.title),
            company: or_placeholder(first_text(scope, &self.company), &placeholders.company),
            location: or_placeholder(first_text(scope, &self.location), &placeholders.location),
            description: or_placeholder(description, &placeholders.description),
            salary: first_text(scope, &self.salary),
            source_url: detail_url.unwrap_or_else(|| self.listing_url.clone()),
            source_board: self.board,
            scraped_at,
        })
    }
}

impl Extractor for HtmlExtractor {
    fn extract(&self, markup: &str) -> Vec<JobRecord> {
        let inner = &self.inner;
        let document = Html::parse_document(markup);
        let scraped_at = Utc::now();

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (index, card) in document.select(&inner.card).enumerate() {
            match inner.read_card(card, scraped_at) {
                Ok(record) => {
                    tracing::debug!(board = %inner.board, title = %record.title, company = %record.company, "Added job");
                    records.push(record);
                }
                Err(reason) => {
                    skipped += 1;
                    tracing::debug!(board = %inner.board, index, ?reason, "Skipped job card");
                }
            }
        }

        if records.is_empty() && skipped == 0 {
            tracing::warn!(board = %inner.board, version = %inner.version, "No job cards found");
        } else {
            tracing::info!(board = %inner.board, count = records.len(), skipped, "Extracted jobs");
        }
        records
    }
}
