use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gist_common::observability::init_logging;
use gist_common::{OutputFormat, PipelineMode};
use gist_config::{GistConfig, GistConfigLoader};
use output::StdoutStore;
use wiring::{build_pipeline, log_config};

mod output;
mod wiring;

/// Summarize a web article into an overview and per-section summaries.
#[derive(Debug, Parser)]
#[command(name = "gist", version)]
struct Cli {
    /// Article URL (http or https).
    url: String,

    /// YAML config file; `./gist.yaml` is read when present.
    #[arg(long, env = "GIST_CONFIG")]
    config: Option<PathBuf>,

    /// structured or flat; overrides `pipeline.mode`.
    #[arg(long)]
    mode: Option<PipelineMode>,

    /// Identity recorded as the requester.
    #[arg(long)]
    user: Option<String>,

    /// json, text or legacy.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins)
    let mut loader = GistConfigLoader::new().with_optional_file("gist.yaml");
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let cfg: GistConfig = loader.load().context("loading configuration")?;

    let log_path = init_logging(log_config(&cfg.logging))?;
    tracing::debug!(log = %log_path.display(), "logging.ready");

    let pipeline = build_pipeline(&cfg, cli.mode)?;
    let store = StdoutStore::new(cli.format);

    let record = pipeline
        .summarize_and_store(&cli.url, cli.user.as_deref(), &store)
        .await
        .with_context(|| format!("summarizing {}", cli.url))?;

    tracing::info!(
        id = %record.id,
        sections = record.summary.sections.len(),
        overview_missing = record.summary.overview_missing(),
        "gist.finished"
    );
    Ok(())
}
