use async_trait::async_trait;
use serde::Serialize;

/// Decoding knobs sent with every summarization request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParams {
    pub max_length: u32,
    pub min_length: u32,
    pub length_penalty: f32,
    pub num_beams: u32,
    pub early_stopping: bool,
}

impl GenerationParams {
    /// Longer output for the whole-document overview.
    pub const OVERVIEW: Self = Self {
        max_length: 250,
        min_length: 100,
        length_penalty: 2.0,
        num_beams: 4,
        early_stopping: true,
    };

    /// Shorter output for a single section.
    pub const SECTION: Self = Self {
        max_length: 150,
        min_length: 40,
        length_penalty: 2.0,
        num_beams: 4,
        early_stopping: true,
    };
}

#[derive(thiserror::Error, Debug)]
pub enum SummarizeError {
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with an error that is not a warm-up notice
    /// (bad token, bad request, rate limit, server fault).
    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Model still loading after {attempts} attempts")]
    StillLoading { attempts: u32 },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Service returned an empty summary")]
    EmptySummary,

    #[error("Configuration error: {0}")]
    Config(String),
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `text` with the given decoding parameters.
    async fn summarize(
        &self,
        text: &str,
        params: &GenerationParams,
    ) -> Result<String, SummarizeError>;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_serialize_with_wire_names() {
        let v = serde_json::to_value(GenerationParams::OVERVIEW).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "max_length": 250,
                "min_length": 100,
                "length_penalty": 2.0,
                "num_beams": 4,
                "early_stopping": true
            })
        );
        assert_eq!(GenerationParams::SECTION.max_length, 150);
        assert_eq!(GenerationParams::SECTION.min_length, 40);
    }
}
