//! `tracing` setup for the `gist` binary and the workspace's tests.
//!
//! Events go to a daily rolling file and, optionally, to stderr, as text or
//! JSON lines. Only the first [`init_logging`] call in a process installs
//! the subscriber; every later call returns the path chosen by the first.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Keeps the background writer alive for the life of the process.
static WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static ACTIVE_LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

const LOG_DIR_ENV: &str = "GIST_LOG_DIR";

/// Line encoding shared by the file and stderr sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Parse a user-facing name; anything other than `json` means text.
    pub fn from_name(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Names the log file (`<app_name>.log.<date>`) and the default directory.
    pub app_name: &'static str,
    /// Where log files go. Unset means `GIST_LOG_DIR`, then
    /// `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    /// Also write events to stderr.
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// `EnvFilter` directives used unless `RUST_LOG` is set.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "gist",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Directory the rolling file is written to.
    pub fn directory(&self) -> PathBuf {
        let configured = self
            .log_dir
            .clone()
            .or_else(|| std::env::var_os(LOG_DIR_ENV).map(PathBuf::from));
        match configured {
            Some(dir) => with_home(&dir),
            None => home_dir()
                .map(|home| home.join(".local/share").join(self.app_name))
                .unwrap_or_else(|| PathBuf::from(self.app_name)),
        }
    }
}

/// Install the global subscriber and return today's log file path.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(active) = ACTIVE_LOG_FILE.get() {
        return Ok(active.clone());
    }

    let dir = config.directory();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    // tracing-appender names daily files `<prefix>.<YYYY-MM-DD>`.
    let prefix = format!("{}.log", config.app_name);
    let log_file = dir.join(format!("{prefix}.{}", Local::now().format("%Y-%m-%d")));

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, &prefix));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer(config.format, writer))
        .with(config.emit_stderr.then(|| stderr_layer(config.format)))
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot install tracing subscriber: {e}"))?;

    let _ = WRITER_GUARD.set(guard);
    let _ = ACTIVE_LOG_FILE.set(log_file.clone());
    Ok(log_file)
}

fn file_layer<S>(format: LogFormat, writer: NonBlocking) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(false).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}

fn stderr_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Text => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand a leading `~/`.
fn with_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
