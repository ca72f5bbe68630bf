//! Loader for gist configuration with YAML + environment overlays.
//!
//! Sources, lowest precedence first:
//!
//! 1. YAML files / inline snippets added to [`GistConfigLoader`]
//! 2. `GIST__`-prefixed environment variables, `__` separating path segments
//!    (e.g. `GIST__SUMMARIZER__MODEL=sshleifer/distilbart-cnn-12-6`)
//!
//! After merging, every string value has `${VAR}` / `$VAR` placeholders
//! expanded from the process environment, recursively up to a fixed depth.
//! Only `summarizer.api_token` is required; everything else has defaults.
use config::{Config, ConfigError, Environment, File, FileFormat};
pub use gist_common::PipelineMode;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct GistConfig {
    pub version: Option<String>,
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote summarization service (Hugging Face inference API shape).
#[derive(Debug, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub api_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_loading_attempts")]
    pub max_loading_attempts: u32,
    #[serde(default = "default_loading_wait_secs")]
    pub default_loading_wait_secs: u64,
    #[serde(default = "default_max_loading_wait_secs")]
    pub max_loading_wait_secs: u64,
    #[serde(default = "default_max_input_words")]
    pub max_input_words: usize,
}

impl SummarizerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub mode: PipelineMode,
    /// Falls back to the mode's own default when unset.
    #[serde(default)]
    pub max_chunk_chars: Option<usize>,
    #[serde(default = "default_max_sections")]
    pub max_sections: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default)]
    pub parallel_sections: bool,
}

impl PipelineConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: PipelineMode::default(),
            max_chunk_chars: None,
            max_sections: default_max_sections(),
            retry_delay_ms: default_retry_delay_ms(),
            parallel_sections: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub emit_stderr: bool,
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            emit_stderr: false,
            filter: default_log_filter(),
            dir: None,
        }
    }
}

fn default_endpoint() -> String {
    "https://api-inference.huggingface.co/".into()
}
fn default_model() -> String {
    "facebook/bart-large-cnn".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_loading_attempts() -> u32 {
    3
}
fn default_loading_wait_secs() -> u64 {
    10
}
fn default_max_loading_wait_secs() -> u64 {
    60
}
fn default_max_input_words() -> usize {
    100
}
fn default_max_sections() -> usize {
    3
}
fn default_retry_delay_ms() -> u64 {
    2000
}
fn default_fetch_timeout_secs() -> u64 {
    15
}
fn default_user_agent() -> String {
    concat!("gist/", env!("CARGO_PKG_VERSION")).into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_log_filter() -> String {
    "info".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct GistConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    // (path, required); files are added before the environment so env always wins.
    files: Vec<(PathBuf, bool)>,
    snippets: Vec<String>,
}

impl Default for GistConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GistConfigLoader {
    /// Start with no files; `GIST__` environment overrides are always applied.
    ///
    /// ```
    /// use gist_config::GistConfigLoader;
    ///
    /// let config = GistConfigLoader::new()
    ///     .with_yaml_str("version: '1'\nsummarizer:\n  api_token: hf_example")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.summarizer.model, "facebook/bart-large-cnn");
    /// assert_eq!(config.pipeline.max_sections, 3);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            files: Vec::new(),
            snippets: Vec::new(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files.push((path.as_ref().to_path_buf(), true));
        self
    }

    /// Attach a file that is skipped when absent, so deployments can rely
    /// purely on environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files.push((path.as_ref().to_path_buf(), false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use gist_config::{GistConfigLoader, PipelineMode};
    ///
    /// let cfg = GistConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// summarizer:
    ///   api_token: "example"
    /// pipeline:
    ///   mode: flat
    ///   retry_delay_ms: 10
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.pipeline.mode, PipelineMode::Flat);
    /// assert_eq!(cfg.pipeline.retry_delay().as_millis(), 10);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.snippets.push(yaml.to_string());
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use gist_config::GistConfigLoader;
    ///
    /// unsafe { std::env::set_var("GIST_DOC_TOKEN", "injected-from-env"); }
    ///
    /// let config = GistConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// summarizer:
    ///   model: "sshleifer/distilbart-cnn-12-6"
    ///   api_token: "${GIST_DOC_TOKEN}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.summarizer.api_token, "injected-from-env");
    /// assert_eq!(config.summarizer.model, "sshleifer/distilbart-cnn-12-6");
    /// assert_eq!(config.summarizer.endpoint, "https://api-inference.huggingface.co/");
    ///
    /// unsafe { std::env::remove_var("GIST_DOC_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<GistConfig, ConfigError> {
        let mut builder = self.builder;
        for (path, required) in &self.files {
            builder = builder.add_source(File::from(path.as_path()).required(*required));
        }
        for snippet in &self.snippets {
            builder = builder.add_source(File::from_str(snippet, FileFormat::Yaml));
        }
        builder = builder.add_source(
            Environment::with_prefix("GIST")
                .separator("__")
                .try_parsing(true),
        );
        let cfg = builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("GIST_T_FOO", Some("bar"), || {
            let mut v = json!("prefix-${GIST_T_FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars(
            [("GIST_T_CITY", Some("Winston")), ("GIST_T_STATE", Some("NC"))],
            || {
                let mut v = json!([
                    "hello-$GIST_T_CITY",
                    { "loc": "${GIST_T_CITY}-${GIST_T_STATE}" },
                    42,
                    true,
                    null
                ]);
                expand_env_in_value(&mut v);
                assert_eq!(
                    v,
                    json!(["hello-Winston", { "loc": "Winston-NC" }, 42, true, null])
                );
            },
        );
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("GIST_T_BAZ", Some("qux")),
                ("GIST_T_BAR", Some("mid-${GIST_T_BAZ}")),
                ("GIST_T_TOP", Some("start-${GIST_T_BAR}-end")),
            ],
            || {
                let mut v = json!("X=${GIST_T_TOP}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars(
            [("GIST_T_A", Some("${GIST_T_B}")), ("GIST_T_B", Some("${GIST_T_A}"))],
            || {
                let mut v = json!("x=${GIST_T_A}-y");
                expand_env_in_value(&mut v);
                let s = v.as_str().unwrap();
                assert!(s.starts_with("x=") && s.ends_with("-y"));
                assert!(s.contains("${"));
            },
        );
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${GIST_T_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${GIST_T_DOES_NOT_EXIST}"));
    }

    #[test]
    fn missing_token_is_an_error() {
        let err = GistConfigLoader::new()
            .with_yaml_str("summarizer:\n  model: x")
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("api_token"));
    }

    #[test]
    fn defaults_fill_every_section() {
        let cfg = GistConfigLoader::new()
            .with_yaml_str("summarizer:\n  api_token: t")
            .load()
            .unwrap();
        assert_eq!(cfg.summarizer.max_loading_attempts, 3);
        assert_eq!(cfg.summarizer.default_loading_wait_secs, 10);
        assert_eq!(cfg.summarizer.max_input_words, 100);
        assert_eq!(cfg.summarizer.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.pipeline.mode, PipelineMode::Structured);
        assert_eq!(cfg.pipeline.max_chunk_chars, None);
        assert_eq!(cfg.pipeline.retry_delay(), Duration::from_secs(2));
        assert!(!cfg.pipeline.parallel_sections);
        assert_eq!(cfg.fetch.timeout(), Duration::from_secs(15));
        assert!(cfg.fetch.user_agent.starts_with("gist/"));
        assert_eq!(cfg.logging.format, "text");
        assert_eq!(cfg.logging.filter, "info");
    }
}
