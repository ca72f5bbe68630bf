//! Remote summarization for gist.
//!
//! This crate exposes the [`traits::Summarizer`] interface, the decoding
//! policies in [`traits::GenerationParams`], and a Hugging Face inference
//! API implementation that rides out model warm-up with a bounded wait
//! loop.
//!
//! # Examples
//! ```no_run
//! use gist_llm::{build_summarizer, GenerationParams, SummarizerSettings};
//!
//! # #[tokio::main]
//! # async fn main() -> gist_common::Result<()> {
//! let settings = SummarizerSettings::new(std::env::var("HUGGING_FACE_API_KEY").unwrap_or_default());
//! let summarizer = build_summarizer(&settings)?;
//! let text = summarizer
//!     .summarize("Rust is a systems language. It is fast.", &GenerationParams::SECTION)
//!     .await;
//! assert_eq!(summarizer.model_name(), "facebook/bart-large-cnn");
//! # let _ = text;
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod huggingface;
pub mod traits;

use std::sync::Arc;

pub use config::SummarizerSettings;
use huggingface::HuggingFaceClient;
pub use traits::{GenerationParams, SummarizeError, Summarizer};

/// Build the configured summarizer, validating its settings.
pub fn build_summarizer(
    settings: &SummarizerSettings,
) -> gist_common::Result<Arc<dyn Summarizer + Send + Sync + 'static>> {
    let client = HuggingFaceClient::new(settings.clone())?;
    tracing::info!(
        target: "gist.summarize",
        model = %settings.model,
        endpoint = %settings.endpoint,
        "summarizer.ready"
    );
    Ok(Arc::new(client))
}
