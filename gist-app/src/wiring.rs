use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use gist_common::PipelineMode;
use gist_common::observability::{LogConfig, LogFormat};
use gist_config::{GistConfig, LoggingConfig, PipelineConfig, SummarizerConfig};
use gist_llm::{SummarizerSettings, build_summarizer};
use gist_pipeline::{Pipeline, PipelineOptions};
use gist_web::HttpPageFetcher;

pub fn log_config(cfg: &LoggingConfig) -> LogConfig {
    LogConfig {
        app_name: "gist",
        log_dir: cfg.dir.as_ref().map(PathBuf::from),
        emit_stderr: cfg.emit_stderr,
        format: LogFormat::from_name(&cfg.format),
        default_filter: cfg.filter.clone(),
    }
}

pub fn summarizer_settings(cfg: &SummarizerConfig) -> SummarizerSettings {
    SummarizerSettings {
        endpoint: cfg.endpoint.clone(),
        model: cfg.model.clone(),
        api_token: cfg.api_token.clone(),
        timeout: cfg.timeout(),
        max_loading_attempts: cfg.max_loading_attempts,
        default_loading_wait: std::time::Duration::from_secs(cfg.default_loading_wait_secs),
        max_loading_wait: std::time::Duration::from_secs(cfg.max_loading_wait_secs),
        max_input_words: cfg.max_input_words,
    }
}

/// `mode` comes from the command line and wins over the file.
pub fn pipeline_options(cfg: &PipelineConfig, mode: Option<PipelineMode>) -> PipelineOptions {
    PipelineOptions {
        mode: mode.unwrap_or(cfg.mode),
        max_chunk_chars: cfg.max_chunk_chars,
        max_sections: cfg.max_sections,
        retry_delay: cfg.retry_delay(),
        parallel_sections: cfg.parallel_sections,
    }
}

pub fn build_pipeline(cfg: &GistConfig, mode: Option<PipelineMode>) -> Result<Pipeline> {
    let fetcher = HttpPageFetcher::new(cfg.fetch.timeout(), &cfg.fetch.user_agent)?;
    let summarizer = build_summarizer(&summarizer_settings(&cfg.summarizer))?;
    let options = pipeline_options(&cfg.pipeline, mode);
    tracing::info!(
        mode = %options.mode,
        max_sections = options.max_sections,
        parallel = options.parallel_sections,
        model = summarizer.model_name(),
        "pipeline.configured"
    );
    Ok(Pipeline::new(Arc::new(fetcher), summarizer, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gist_config::GistConfigLoader;

    fn cfg(yaml: &str) -> GistConfig {
        GistConfigLoader::new().with_yaml_str(yaml).load().unwrap()
    }

    #[test]
    fn cli_mode_overrides_config() {
        let c = cfg("summarizer:\n  api_token: t\npipeline:\n  mode: flat\n  max_sections: 5\n");
        let opts = pipeline_options(&c.pipeline, None);
        assert_eq!(opts.mode, PipelineMode::Flat);
        assert_eq!(opts.max_sections, 5);
        assert_eq!(opts.chunker().max_len(), 4000);

        let opts = pipeline_options(&c.pipeline, Some(PipelineMode::Structured));
        assert_eq!(opts.mode, PipelineMode::Structured);
    }

    #[test]
    fn summarizer_settings_carry_loading_policy() {
        let c = cfg("summarizer:\n  api_token: t\n  max_loading_attempts: 5\n  max_loading_wait_secs: 7\n");
        let s = summarizer_settings(&c.summarizer);
        assert_eq!(s.max_loading_attempts, 5);
        assert_eq!(s.max_loading_wait.as_secs(), 7);
        assert_eq!(s.default_loading_wait.as_secs(), 10);
        assert_eq!(s.max_input_words, 100);
    }

    #[test]
    fn logging_maps_format_and_dir() {
        let c = cfg("summarizer:\n  api_token: t\nlogging:\n  format: json\n  dir: /tmp/gist-logs\n");
        let log = log_config(&c.logging);
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.log_dir, Some(PathBuf::from("/tmp/gist-logs")));
        assert_eq!(log.default_filter, "info");
    }

    #[test]
    fn empty_token_fails_to_build() {
        let c = cfg("summarizer:\n  api_token: ''\n");
        assert!(build_pipeline(&c, None).is_err());
    }
}
