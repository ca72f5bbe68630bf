//! Common types and utilities shared across gist crates.
//!
//! This crate defines the summary data model, the fatal error taxonomy,
//! observability helpers, and the one sleep helper every retry path uses.
//! It is intentionally lightweight so that all crates can depend on it
//! without introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`Section`] and [`StructuredSummary`]: what the pipeline produces
//! - [`PipelineMode`]: which extraction strategy and chunk size to use
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`GistError`] and [`Result`]: Shared fatal error handling
//! - [`sleep_for`]: the wait used by every retry path
//!
//! # Examples
//!
//! ```rust
//! use gist_common::{Section, StructuredSummary, NO_OVERVIEW};
//!
//! let summary = StructuredSummary::new(None, vec![Section::new("Intro", "Short text.")]);
//! assert_eq!(summary.overview, NO_OVERVIEW);
//! assert_eq!(summary.sections.len(), 1);
//! ```
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod observability;

/// Overview text used when no overview could be generated.
pub const NO_OVERVIEW: &str = "No overview available.";

/// A heading-delimited region of a document.
///
/// Before summarization `summary` holds the raw body text under the heading;
/// afterwards it holds the model's summary of that text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub summary: String,
}

impl Section {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
        }
    }
}

/// Final output of the pipeline: an overview plus summarized sections in
/// source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSummary {
    pub overview: String,
    pub sections: Vec<Section>,
}

impl StructuredSummary {
    /// Build a summary, substituting [`NO_OVERVIEW`] for a missing overview.
    pub fn new(overview: Option<String>, sections: Vec<Section>) -> Self {
        let overview = overview
            .filter(|o| !o.trim().is_empty())
            .unwrap_or_else(|| NO_OVERVIEW.to_string());
        Self { overview, sections }
    }

    /// True when the overview is the fallback sentinel.
    pub fn overview_missing(&self) -> bool {
        self.overview == NO_OVERVIEW
    }
}

/// Extraction strategy and chunk sizing used for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    /// Heading-delimited sections plus an overview; 500 character chunks.
    #[default]
    Structured,
    /// Single content region, overview only; 4000 character chunks.
    Flat,
}

impl std::fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineMode::Structured => f.write_str("structured"),
            PipelineMode::Flat => f.write_str("flat"),
        }
    }
}

impl std::str::FromStr for PipelineMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" => Ok(PipelineMode::Structured),
            "flat" => Ok(PipelineMode::Flat),
            other => Err(format!("unknown mode '{other}' (expected structured or flat)")),
        }
    }
}

/// Preferred output format for rendered results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The full stored record.
    #[default]
    Json,
    /// Overview and sections for a terminal.
    Text,
    /// `{overview, keyPoints}`.
    Legacy,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            "legacy" => Ok(OutputFormat::Legacy),
            other => Err(format!(
                "unknown format '{other}' (expected json, text or legacy)"
            )),
        }
    }
}

/// Fatal errors of the summarization pipeline.
///
/// Model failures are not represented here: past extraction they only
/// shrink the result.
#[derive(thiserror::Error, Debug)]
pub enum GistError {
    /// The requested URL is not an absolute http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The source page could not be retrieved.
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// No strategy found any text in the page.
    #[error("No extractable content at {0}")]
    Extraction(String),

    /// The persistence collaborator rejected the result.
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenient alias for results that use [`GistError`].
pub type Result<T> = std::result::Result<T, GistError>;

/// Suspend the current task for `dur`.
///
/// Every wait in the workspace (model warm-up, retry delays) goes through
/// here so the behaviour is uniform and visible in traces.
pub async fn sleep_for(dur: Duration) {
    if dur.is_zero() {
        return;
    }
    tracing::debug!(wait_ms = dur.as_millis() as u64, "sleep");
    tokio::time::sleep(dur).await;
}
