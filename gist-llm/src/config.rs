use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/";
pub const DEFAULT_MODEL: &str = "facebook/bart-large-cnn";

/// Everything needed to reach the hosted summarization model.
#[derive(Debug, Clone)]
pub struct SummarizerSettings {
    pub endpoint: String,
    pub model: String,
    pub api_token: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Total sends allowed while the model reports it is loading.
    pub max_loading_attempts: u32,
    /// Wait used when a loading reply carries no `estimated_time`.
    pub default_loading_wait: Duration,
    /// Upper bound on any single loading wait.
    pub max_loading_wait: Duration,
    /// Input is cut to this many words before sending.
    pub max_input_words: usize,
}

impl SummarizerSettings {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_token: api_token.into(),
            timeout: Duration::from_secs(30),
            max_loading_attempts: 3,
            default_loading_wait: Duration::from_secs(10),
            max_loading_wait: Duration::from_secs(60),
            max_input_words: 100,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}
