//! End-to-end article summarization.
//!
//! [`Pipeline`] drives one request through
//! `Fetch → Extract → Chunk → SummarizeOverview → SummarizeSections → Assemble`.
//! Invalid URLs, fetch failures and pages with no extractable text are
//! fatal. Past extraction, model failures only shrink the result: a failed
//! overview becomes [`gist_common::NO_OVERVIEW`] and failed sections are
//! left out.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use gist_llm::{build_summarizer, SummarizerSettings};
//! use gist_pipeline::{Pipeline, PipelineOptions};
//! use gist_web::HttpPageFetcher;
//!
//! # #[tokio::main]
//! # async fn main() -> gist_common::Result<()> {
//! let fetcher = Arc::new(HttpPageFetcher::new(Duration::from_secs(15), "gist/0.1")?);
//! let summarizer = build_summarizer(&SummarizerSettings::new("hf_token"))?;
//! let pipeline = Pipeline::new(fetcher, summarizer, PipelineOptions::default());
//!
//! let summary = pipeline.summarize("https://example.com/post").await?;
//! println!("{}", summary.overview);
//! # Ok(())
//! # }
//! ```

pub mod record;
pub mod store;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use gist_common::{GistError, PipelineMode, Result, Section, StructuredSummary, sleep_for};
use gist_llm::{GenerationParams, Summarizer};
use gist_web::text::excerpt;
use gist_web::{Chunker, Extraction, PageFetcher, Strategy, extract, normalize, validate_url};
use url::Url;

pub use record::{LegacySummary, SummaryRecord};
pub use store::{MemoryStore, SummaryStore};

/// Characters of extracted text kept on a [`SummaryRecord`].
pub const EXCERPT_CHARS: usize = 1000;

/// Calls made for one piece of text before giving up on it.
const SUMMARY_ATTEMPTS: u32 = 2;

/// Knobs for one [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub mode: PipelineMode,
    /// Overrides the mode's chunk size when set.
    pub max_chunk_chars: Option<usize>,
    /// Only the first `max_sections` discovered sections are summarized.
    pub max_sections: usize,
    /// Wait between the first and second attempt at a summary.
    pub retry_delay: Duration,
    /// Summarize sections concurrently instead of one after another.
    pub parallel_sections: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            mode: PipelineMode::Structured,
            max_chunk_chars: None,
            max_sections: 3,
            retry_delay: Duration::from_secs(2),
            parallel_sections: false,
        }
    }
}

impl PipelineOptions {
    pub fn chunker(&self) -> Chunker {
        self.max_chunk_chars
            .map(Chunker::new)
            .unwrap_or_else(|| Chunker::for_mode(self.mode))
    }
}

/// Pipeline stages, as they appear in log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Extract,
    Chunk,
    SummarizeOverview,
    SummarizeSections,
    Assemble,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Extract => "extract",
            Stage::Chunk => "chunk",
            Stage::SummarizeOverview => "summarize_overview",
            Stage::SummarizeSections => "summarize_sections",
            Stage::Assemble => "assemble",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finished request along with what was learned about the page.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub url: Url,
    pub summary: StructuredSummary,
    /// Characters of extracted text.
    pub content_length: usize,
    /// First [`EXCERPT_CHARS`] characters of extracted text.
    pub content_excerpt: String,
    /// blake3 hex digest of the fetched HTML.
    pub html_checksum: String,
}

/// Fetches, extracts and summarizes articles. Cheap to share behind `Arc`.
pub struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    summarizer: Arc<dyn Summarizer + Send + Sync>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        summarizer: Arc<dyn Summarizer + Send + Sync>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            options,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn model_name(&self) -> &str {
        self.summarizer.model_name()
    }

    /// Summarize the article at `url`.
    pub async fn summarize(&self, url: &str) -> Result<StructuredSummary> {
        Ok(self.run(url).await?.summary)
    }

    /// Summarize the article at `url` and hand the result to `store`.
    pub async fn summarize_and_store(
        &self,
        url: &str,
        requested_by: Option<&str>,
        store: &dyn SummaryStore,
    ) -> Result<SummaryRecord> {
        let run = self.run(url).await?;
        let record = SummaryRecord::from_run(
            run,
            requested_by.map(str::to_string),
            self.options.mode,
            self.model_name(),
        );
        store.store(&record).await?;
        tracing::info!(
            target: "gist.pipeline",
            id = %record.id,
            url = %record.source_url,
            "pipeline.stored"
        );
        Ok(record)
    }

    /// Run every stage and keep the page facts alongside the summary.
    pub async fn run(&self, url: &str) -> Result<PipelineRun> {
        let mode = self.options.mode;
        tracing::info!(target: "gist.pipeline", stage = %Stage::Fetch, %mode, url, "pipeline.start");
        let url = validate_url(url)?;
        let page = self.fetcher.fetch(&url).await?;

        let extraction = extract_page(&page.html, mode);
        tracing::info!(
            target: "gist.pipeline",
            stage = %Stage::Extract,
            sections = extraction.sections.len(),
            main_chars = extraction.main_content.len(),
            "pipeline.extracted"
        );
        if extraction.is_empty() {
            tracing::warn!(target: "gist.pipeline", stage = %Stage::Extract, url = %url, "pipeline.no_content");
            return Err(GistError::Extraction(url.to_string()));
        }

        let chunker = self.options.chunker();
        let overview_input = extraction
            .overview_source()
            .and_then(|text| chunker.first_chunk(text));
        tracing::debug!(
            target: "gist.pipeline",
            stage = %Stage::Chunk,
            max_len = chunker.max_len(),
            has_input = overview_input.is_some(),
            "pipeline.chunked"
        );

        let overview = match overview_input {
            Some(chunk) => {
                self.summarize_with_retry(
                    &chunk,
                    &GenerationParams::OVERVIEW,
                    Stage::SummarizeOverview,
                    "overview",
                )
                .await
            }
            None => {
                tracing::info!(
                    target: "gist.pipeline",
                    stage = %Stage::SummarizeOverview,
                    "pipeline.overview_skipped"
                );
                None
            }
        };
        let sections = self.summarize_sections(&extraction.sections).await;

        let summary = StructuredSummary::new(overview, sections);
        tracing::info!(
            target: "gist.pipeline",
            stage = %Stage::Assemble,
            url = %url,
            overview_missing = summary.overview_missing(),
            sections = summary.sections.len(),
            "pipeline.done"
        );

        let text = extracted_text(&extraction);
        Ok(PipelineRun {
            content_length: extraction.content_length(),
            content_excerpt: excerpt(&text, EXCERPT_CHARS).to_string(),
            html_checksum: page.html_checksum(),
            url,
            summary,
        })
    }

    async fn summarize_sections(&self, sections: &[Section]) -> Vec<Section> {
        let picked = &sections[..sections.len().min(self.options.max_sections)];

        let results = if self.options.parallel_sections {
            join_all(picked.iter().map(|section| self.summarize_section(section))).await
        } else {
            let mut out = Vec::with_capacity(picked.len());
            for section in picked {
                out.push(self.summarize_section(section).await);
            }
            out
        };

        picked
            .iter()
            .zip(results)
            .filter_map(|(section, summary)| {
                summary
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| Section::new(section.title.clone(), s))
            })
            .collect()
    }

    async fn summarize_section(&self, section: &Section) -> Option<String> {
        self.summarize_with_retry(
            &section.summary,
            &GenerationParams::SECTION,
            Stage::SummarizeSections,
            &section.title,
        )
        .await
    }

    /// One call, then one more after `retry_delay`; `None` when both fail.
    async fn summarize_with_retry(
        &self,
        text: &str,
        params: &GenerationParams,
        stage: Stage,
        label: &str,
    ) -> Option<String> {
        for attempt in 1..=SUMMARY_ATTEMPTS {
            match self.summarizer.summarize(text, params).await {
                Ok(summary) => return Some(summary),
                Err(e) => {
                    tracing::warn!(
                        target: "gist.pipeline",
                        %stage,
                        label,
                        attempt,
                        error = %e,
                        "pipeline.summary_failed"
                    );
                    if attempt < SUMMARY_ATTEMPTS {
                        sleep_for(self.options.retry_delay).await;
                    }
                }
            }
        }
        None
    }
}

/// Parse, clean and locate in one synchronous step; the DOM never outlives it.
fn extract_page(html: &str, mode: PipelineMode) -> Extraction {
    let doc = normalize(html);
    let strategy = match mode {
        PipelineMode::Structured => Strategy::Sections,
        PipelineMode::Flat => Strategy::Selectors,
    };
    extract(&doc, strategy)
}

fn extracted_text(extraction: &Extraction) -> String {
    if !extraction.main_content.is_empty() {
        return extraction.main_content.clone();
    }
    extraction
        .sections
        .iter()
        .map(|s| s.summary.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunker_follows_mode_unless_overridden() {
        let mut opts = PipelineOptions::default();
        assert_eq!(opts.chunker().max_len(), 500);
        opts.mode = PipelineMode::Flat;
        assert_eq!(opts.chunker().max_len(), 4000);
        opts.max_chunk_chars = Some(42);
        assert_eq!(opts.chunker().max_len(), 42);
    }

    #[test]
    fn flat_mode_uses_selectors_only() {
        let html = "<body><article><h2>Head</h2><p>Body text.</p></article></body>";
        let flat = extract_page(html, PipelineMode::Flat);
        assert!(flat.sections.is_empty());
        assert_eq!(flat.main_content, "Head Body text.");

        let structured = extract_page(html, PipelineMode::Structured);
        assert_eq!(structured.sections, vec![Section::new("Head", "Body text.")]);
    }

    #[test]
    fn extracted_text_falls_back_to_sections() {
        let e = Extraction {
            sections: vec![Section::new("A", "One."), Section::new("B", "Two.")],
            main_content: String::new(),
        };
        assert_eq!(extracted_text(&e), "One. Two.");
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::SummarizeOverview.to_string(), "summarize_overview");
        assert_eq!(Stage::Fetch.as_str(), "fetch");
    }
}
