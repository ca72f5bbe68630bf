//! What a finished request hands to persistence.

use chrono::{DateTime, Utc};
use gist_common::{PipelineMode, StructuredSummary};
use gist_web::split_sentences;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::PipelineRun;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub id: Uuid,
    pub requested_by: Option<String>,
    pub source_url: String,
    pub mode: PipelineMode,
    pub model: String,
    pub summary: StructuredSummary,
    pub content_length: usize,
    pub content_excerpt: String,
    pub html_checksum: String,
    pub created_at: DateTime<Utc>,
}

impl SummaryRecord {
    pub fn from_run(
        run: PipelineRun,
        requested_by: Option<String>,
        mode: PipelineMode,
        model: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            requested_by,
            source_url: run.url.to_string(),
            mode,
            model: model.to_string(),
            summary: run.summary,
            content_length: run.content_length,
            content_excerpt: run.content_excerpt,
            html_checksum: run.html_checksum,
            created_at: Utc::now(),
        }
    }

    /// The flat `{overview, keyPoints}` shape.
    pub fn legacy(&self) -> LegacySummary {
        LegacySummary::from(&self.summary)
    }
}

/// Overview plus a flat list of key points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySummary {
    pub overview: String,
    #[serde(rename = "keyPoints")]
    pub key_points: Vec<String>,
}

impl From<&StructuredSummary> for LegacySummary {
    /// Key points are the section summaries, or the overview's sentences
    /// when there are no sections. A missing overview has no key points.
    fn from(summary: &StructuredSummary) -> Self {
        let key_points = if !summary.sections.is_empty() {
            summary.sections.iter().map(|s| s.summary.clone()).collect()
        } else if summary.overview_missing() {
            Vec::new()
        } else {
            split_sentences(&summary.overview)
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            overview: summary.overview.clone(),
            key_points,
        }
    }
}
