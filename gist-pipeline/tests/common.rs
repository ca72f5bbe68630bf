#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use async_trait::async_trait;
use gist_common::observability::{LogConfig, LogFormat};
use gist_common::{GistError, Result};
use gist_llm::{GenerationParams, SummarizeError, Summarizer};
use gist_web::{FetchedPage, PageFetcher};
use url::Url;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "gist-tests",
            log_dir: Some(std::env::temp_dir().join("gist-tests")),
            emit_stderr: true,
            format: LogFormat::from_name(&std::env::var("GIST_LOG_FORMAT").unwrap_or_default()),
            default_filter: "debug".to_string(),
        };

        gist_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// Serves the same HTML for every URL.
pub struct StaticFetcher {
    pub html: String,
    pub calls: Mutex<usize>,
}

impl StaticFetcher {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        *self.calls.lock().unwrap() += 1;
        Ok(FetchedPage {
            url: url.clone(),
            html: self.html.clone(),
        })
    }
}

/// Fails every fetch the way an unreachable host would.
pub struct FailingFetcher;

#[async_trait]
impl PageFetcher for FailingFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        Err(GistError::Fetch {
            url: url.to_string(),
            reason: "HTTP 404".into(),
        })
    }
}

type Script = dyn Fn(&str, &GenerationParams, usize) -> std::result::Result<String, SummarizeError>
    + Send
    + Sync;

/// Answers through a closure that also sees how often the same input was
/// already requested.
pub struct ScriptedSummarizer {
    script: Box<Script>,
    seen: Mutex<HashMap<String, usize>>,
    log: Mutex<Vec<(String, u32)>>,
}

impl ScriptedSummarizer {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&str, &GenerationParams, usize) -> std::result::Result<String, SummarizeError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            script: Box::new(script),
            seen: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Echo the input back prefixed with `summary:`.
    pub fn echo() -> Self {
        Self::new(|text, _, _| Ok(format!("summary: {text}")))
    }

    /// Every call so far as `(input, max_length)`.
    pub fn calls(&self) -> Vec<(String, u32)> {
        self.log.lock().unwrap().clone()
    }

    pub fn calls_with_max_length(&self, max_length: u32) -> usize {
        self.calls().iter().filter(|(_, m)| *m == max_length).count()
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(
        &self,
        text: &str,
        params: &GenerationParams,
    ) -> std::result::Result<String, SummarizeError> {
        let prior = {
            let mut seen = self.seen.lock().unwrap();
            let n = seen.entry(text.to_string()).or_insert(0);
            let prior = *n;
            *n += 1;
            prior
        };
        self.log
            .lock()
            .unwrap()
            .push((text.to_string(), params.max_length));
        (self.script)(text, params, prior)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub fn unavailable() -> SummarizeError {
    SummarizeError::Upstream {
        status: 503,
        message: "unavailable".into(),
    }
}
