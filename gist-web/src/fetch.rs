//! Single best-effort page fetch.
//!
//! No retries: a network error or a non-2xx status is a fetch failure and
//! ends the request.

use std::time::Duration;

use async_trait::async_trait;
use gist_common::{GistError, Result};
use gist_http::{HttpClient, HttpError, RequestOpts};
use url::Url;

/// Raw HTML of a fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub html: String,
}

impl FetchedPage {
    /// blake3 hex digest of the raw HTML.
    pub fn html_checksum(&self) -> String {
        blake3::hash(self.html.as_bytes()).to_hex().to_string()
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage>;
}

/// Check that `raw` is an absolute http(s) URL with a host.
///
/// ```
/// use gist_web::validate_url;
///
/// assert!(validate_url("https://example.com/post").is_ok());
/// assert!(validate_url("ftp://example.com/file").is_err());
/// assert!(validate_url("not a url").is_err());
/// ```
pub fn validate_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| GistError::InvalidUrl(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(GistError::InvalidUrl(format!(
            "{raw}: unsupported scheme {}",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(GistError::InvalidUrl(format!("{raw}: missing host")));
    }
    Ok(url)
}

/// Plain HTTP GET fetcher; follows redirects the way reqwest does by default.
#[derive(Clone)]
pub struct HttpPageFetcher {
    http: HttpClient,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let http = HttpClient::detached()
            .and_then(|c| c.with_user_agent(user_agent))
            .map_err(|e| GistError::Config(format!("page fetcher: {e}")))?
            .with_timeout(timeout);
        Ok(Self { http })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        tracing::info!(target: "gist.fetch", url = %url, "fetch.start");
        let html = self
            .http
            .get_text(url.as_str(), RequestOpts::default())
            .await
            .map_err(|e| {
                let reason = match &e {
                    HttpError::Api { status, .. } => format!("HTTP {status}"),
                    other => other.to_string(),
                };
                tracing::warn!(target: "gist.fetch", url = %url, %reason, "fetch.failed");
                GistError::Fetch {
                    url: url.to_string(),
                    reason,
                }
            })?;
        tracing::info!(target: "gist.fetch", url = %url, bytes = html.len(), "fetch.done");
        Ok(FetchedPage {
            url: url.clone(),
            html,
        })
    }
}
