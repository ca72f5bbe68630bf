//! Client for the Hugging Face hosted inference API.
//!
//! A cold model answers with `{"error": "... is currently loading",
//! "estimated_time": 20.0}` (usually status 503). The client waits the
//! estimated time, capped, and resends, up to a fixed number of sends.
//! Every other failure is returned at once.

use std::time::Duration;

use async_trait::async_trait;
use gist_common::{sleep_for, GistError};
use gist_http::{Auth, HttpClient, HttpError, RawResponse, RequestOpts};
use serde::{Deserialize, Serialize};

use crate::config::SummarizerSettings;
use crate::traits::{GenerationParams, SummarizeError, Summarizer};

pub struct HuggingFaceClient {
    client: HttpClient,
    path: String,
    settings: SummarizerSettings,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParams,
}

/// Every reply body the service is known to send.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceReply {
    Batch(Vec<Generated>),
    Single(Generated),
    Failure(FailureReply),
}

#[derive(Debug, Deserialize)]
struct Generated {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
struct FailureReply {
    error: String,
    #[serde(default)]
    estimated_time: Option<f64>,
}

impl FailureReply {
    fn is_loading(&self) -> bool {
        self.estimated_time.is_some() || self.error.to_ascii_lowercase().contains("loading")
    }
}

/// What one send produced, short of a hard error.
#[derive(Debug, PartialEq)]
enum Outcome {
    Summary(String),
    Loading(Duration),
}

impl HuggingFaceClient {
    pub fn new(settings: SummarizerSettings) -> gist_common::Result<Self> {
        if settings.api_token.trim().is_empty() {
            return Err(GistError::Config(
                "summarizer.api_token is empty".to_string(),
            ));
        }
        if settings.model.trim().is_empty() {
            return Err(GistError::Config("summarizer.model is empty".to_string()));
        }

        let mut endpoint = settings.endpoint.clone();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        let client = HttpClient::new(&endpoint)
            .and_then(|c| c.with_user_agent(concat!("gist/", env!("CARGO_PKG_VERSION"))))
            .map_err(|e| GistError::Config(format!("HttpClient init failed: {e}")))?
            .with_timeout(settings.timeout);

        Ok(Self {
            client,
            path: format!("models/{}", settings.model.trim_matches('/')),
            settings,
        })
    }

    fn loading_wait(&self, estimated_time: Option<f64>) -> Duration {
        let cap = self.settings.max_loading_wait;
        match estimated_time {
            Some(secs) if secs.is_finite() => {
                Duration::try_from_secs_f64(secs.clamp(0.0, cap.as_secs_f64())).unwrap_or(cap)
            }
            _ => self.settings.default_loading_wait.min(cap),
        }
    }

    fn interpret(&self, raw: RawResponse) -> Result<Outcome, SummarizeError> {
        let status = raw.status;
        let reply = match raw.json::<InferenceReply>() {
            Ok(reply) => reply,
            Err(_) if !status.is_success() => {
                return Err(SummarizeError::Upstream {
                    status: status.as_u16(),
                    message: raw.error_message(),
                });
            }
            Err(e) => return Err(SummarizeError::Malformed(e.to_string())),
        };

        match reply {
            InferenceReply::Failure(failure) if failure.is_loading() => {
                Ok(Outcome::Loading(self.loading_wait(failure.estimated_time)))
            }
            InferenceReply::Failure(failure) => Err(SummarizeError::Upstream {
                status: status.as_u16(),
                message: failure.error,
            }),
            _ if !status.is_success() => Err(SummarizeError::Upstream {
                status: status.as_u16(),
                message: raw.error_message(),
            }),
            InferenceReply::Single(generated) => summary_text(Some(generated)),
            InferenceReply::Batch(batch) => summary_text(batch.into_iter().next()),
        }
    }
}

fn summary_text(generated: Option<Generated>) -> Result<Outcome, SummarizeError> {
    let text = generated
        .map(|g| g.summary_text.trim().to_string())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(SummarizeError::EmptySummary);
    }
    Ok(Outcome::Summary(text))
}

fn truncate_words(s: &str, max_words: usize) -> String {
    s.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

fn http_to_summarize(e: HttpError) -> SummarizeError {
    match e {
        HttpError::Network(msg) => SummarizeError::Network(msg),
        HttpError::Url(msg) | HttpError::Build(msg) => SummarizeError::Config(msg),
        HttpError::Decode(msg, _) => SummarizeError::Malformed(msg),
        HttpError::Api {
            status, message, ..
        } => SummarizeError::Upstream {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl Summarizer for HuggingFaceClient {
    async fn summarize(
        &self,
        text: &str,
        params: &GenerationParams,
    ) -> Result<String, SummarizeError> {
        let inputs = truncate_words(text, self.settings.max_input_words);
        let request = InferenceRequest {
            inputs: &inputs,
            parameters: params,
        };
        let max_attempts = self.settings.max_loading_attempts.max(1);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            tracing::debug!(
                target: "gist.summarize",
                model = %self.settings.model,
                attempt,
                input_words = inputs.split(' ').count(),
                max_length = params.max_length,
                "summarize.request"
            );

            let opts = RequestOpts {
                timeout: Some(self.settings.timeout),
                auth: Some(Auth::Bearer(&self.settings.api_token)),
            };
            let raw = self
                .client
                .post_json_raw(&self.path, &request, opts)
                .await
                .map_err(http_to_summarize)?;

            match self.interpret(raw)? {
                Outcome::Summary(summary) => {
                    tracing::debug!(
                        target: "gist.summarize",
                        attempt,
                        chars = summary.len(),
                        "summarize.done"
                    );
                    return Ok(summary);
                }
                Outcome::Loading(_) if attempt >= max_attempts => {
                    tracing::warn!(
                        target: "gist.summarize",
                        model = %self.settings.model,
                        attempts = attempt,
                        "summarize.still_loading"
                    );
                    return Err(SummarizeError::StillLoading { attempts: attempt });
                }
                Outcome::Loading(wait) => {
                    tracing::info!(
                        target: "gist.summarize",
                        model = %self.settings.model,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "summarize.loading"
                    );
                    sleep_for(wait).await;
                }
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}
