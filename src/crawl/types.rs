use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Outcome of the homepage fetch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HomepageStatus {
    Ok,
    NonHtml,
    TooLarge,
    Timeout,
    Error,
    RejectedPublication,
    /// Crawling disabled in configuration.
    Skipped,
}

/// One recorded evidence error. Crawling continues after these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlErrorEntry {
    pub label: String,
    pub message: String,
    pub url: String,
    pub context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlMetrics {
    /// Every network fetch issued, homepage included.
    pub fetch_attempts: usize,
    pub frames_fetched: usize,
    pub frames_skipped_depth: usize,
    pub frames_skipped_budget: usize,
    pub elapsed_ms: u64,
    pub errors: Vec<CrawlErrorEntry>,
}

impl CrawlMetrics {
    pub fn record_error(
        &mut self,
        label: impl Into<String>,
        message: impl Into<String>,
        url: &str,
        context: impl Into<String>,
    ) {
        self.errors.push(CrawlErrorEntry {
            label: label.into(),
            message: message.into(),
            url: url.to_string(),
            context: context.into(),
        });
    }
}

/// Per-candidate crawl result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub homepage_scraped: bool,
    pub homepage_status: HomepageStatus,
    pub homepage_error: Option<String>,
    /// URL actually fetched as the homepage.
    pub homepage_url: Option<String>,
    /// True when a publication URL was replaced by an alternative.
    pub homepage_substituted: bool,
    pub http_status: Option<u16>,
    pub documentation_urls: BTreeSet<String>,
    pub repository_urls: BTreeSet<String>,
    pub keyword_hits: BTreeSet<String>,
    pub metrics: CrawlMetrics,
}

impl EvidenceBundle {
    pub fn new(status: HomepageStatus) -> Self {
        Self {
            homepage_scraped: false,
            homepage_status: status,
            homepage_error: None,
            homepage_url: None,
            homepage_substituted: false,
            http_status: None,
            documentation_urls: BTreeSet::new(),
            repository_urls: BTreeSet::new(),
            keyword_hits: BTreeSet::new(),
            metrics: CrawlMetrics::default(),
        }
    }

    pub fn skipped() -> Self {
        Self::new(HomepageStatus::Skipped)
    }

    /// True when a homepage URL is known, it is not a publication page and
    /// fetching it neither failed nor returned an HTTP error status. A
    /// skipped crawl keeps the URL usable.
    pub fn has_usable_homepage(&self) -> bool {
        self.homepage_url.is_some()
            && self.homepage_status != HomepageStatus::RejectedPublication
            && self.http_status.is_none_or(|code| code < 400)
            && self
                .homepage_error
                .as_deref()
                .is_none_or(|error| error.trim().is_empty())
    }
}
