use std::io::Write;

use async_trait::async_trait;
use gist_common::{GistError, OutputFormat, Result};
use gist_pipeline::{SummaryRecord, SummaryStore};

/// Prints each record to stdout instead of persisting it.
pub struct StdoutStore {
    format: OutputFormat,
}

impl StdoutStore {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

#[async_trait]
impl SummaryStore for StdoutStore {
    async fn store(&self, record: &SummaryRecord) -> Result<()> {
        let rendered = render(record, self.format)?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{rendered}").map_err(|e| GistError::Store(format!("stdout: {e}")))
    }
}

pub fn render(record: &SummaryRecord, format: OutputFormat) -> Result<String> {
    let json = |v: serde_json::Result<String>| v.map_err(|e| GistError::Store(e.to_string()));
    match format {
        OutputFormat::Json => json(serde_json::to_string_pretty(record)),
        OutputFormat::Legacy => json(serde_json::to_string_pretty(&record.legacy())),
        OutputFormat::Text => Ok(render_text(record)),
    }
}

fn render_text(record: &SummaryRecord) -> String {
    let mut out = format!("{}\n\n{}\n", record.source_url, record.summary.overview);
    for section in &record.summary.sections {
        out.push_str(&format!("\n## {}\n{}\n", section.title, section.summary));
    }
    out
}
