//! Minimal single-attempt HTTP client with safe logging and bearer auth.
//!
//! - Request options: bearer `Auth`, timeout
//! - Redacts sensitive query params and never logs secret values
//! - Raw responses for callers that need to read non-2xx bodies
//! - Optional *raw* request/response logging via `GIST_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), gist_http::HttpError> {
//! let client = gist_http::HttpClient::new("https://api.example.com")?;
//! let body = client
//!     .get_text("v1/items", gist_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Security: `Auth::Bearer` values are sanitized before use, and logs only
//! ever include the auth kind (bearer/none), not the secret.
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated) and final errors, and
//! (optionally) raw request/response lines (target `http.raw`).

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "GIST_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

const SECRET_PARAMS: &[&str] = &[
    "access_token",
    "authorization",
    "auth",
    "key",
    "api_key",
    "token",
    "secret",
    "client_secret",
    "bearer",
];

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{method}")];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    if let Some(bytes) = body {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                let s = truncate_chars(s, RAW_MAX_BODY);
                parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
            }
            Err(_) => parts.push(format!("--data-binary @- # ({} bytes)", bytes.len())),
        }
    }
    let (host_path, query) = redact_query(url);
    let query = query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    if query.is_empty() {
        parts.push(format!("'{}://{}'", url.scheme(), host_path));
    } else {
        parts.push(format!("'{}://{}?{}'", url.scheme(), host_path, query));
    }
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("authorization") {
                val = "Bearer <redacted>".into();
            }
            (key, val)
        })
        .collect()
}

fn is_secret_param(name: &str) -> bool {
    SECRET_PARAMS.contains(&name.to_ascii_lowercase().as_str())
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

// ==============================
// Auth & Request Options
// ==============================

/// How a request authenticates.
///
/// ```
/// use gist_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// match bearer {
///     Auth::Bearer(value) => assert_eq!(value, "token"),
///     Auth::None => unreachable!(),
/// }
/// ```
#[derive(Clone, Copy, Debug)]
pub enum Auth<'a> {
    /// `Authorization: Bearer <token>`; the token is sanitized first.
    Bearer(&'a str),
    None,
}

impl Auth<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
            Auth::None => "none",
        }
    }
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use gist_http::{Auth, RequestOpts};
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     auth: Some(Auth::Bearer("hf_token")),
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    /// Overrides the client's default timeout.
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
}

/// Status and body of a completed exchange, whatever the status code.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub request_id: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON regardless of status.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_slice::<T>(&self.body)
            .map_err(|e| HttpError::Decode(e.to_string(), snip_body(&self.body)))
    }

    /// Best-effort human readable error message from the body.
    pub fn error_message(&self) -> String {
        extract_error_message(&self.body)
    }

    /// Turn a non-success response into [`HttpError::Api`].
    pub fn into_api_error(self) -> HttpError {
        HttpError::Api {
            status: self.status,
            message: self.error_message(),
            request_id: self.request_id,
        }
    }
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Option<Url>,
    inner: Client,
    user_agent: Option<HeaderValue>,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use gist_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        Self::build(Some(base))
    }

    /// Construct a client with no base; every request must use an absolute URL.
    pub fn detached() -> Result<Self, HttpError> {
        Self::build(None)
    }

    fn build(base: Option<Url>) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            user_agent: None,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    ///
    /// ```no_run
    /// use gist_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?
    ///     .with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Send this `User-Agent` with every request.
    pub fn with_user_agent(mut self, ua: &str) -> Result<Self, HttpError> {
        let value = HeaderValue::from_str(ua)
            .map_err(|e| HttpError::Build(format!("invalid User-Agent: {e}")))?;
        self.user_agent = Some(value);
        Ok(self)
    }

    /// GET a text body (e.g. an HTML page). Non-2xx statuses are errors.
    pub async fn get_text(&self, path: &str, opts: RequestOpts<'_>) -> Result<String, HttpError> {
        let raw = self.send(Method::GET, path, None, opts).await?;
        if raw.is_success() {
            Ok(raw.text())
        } else {
            Err(raw.into_api_error())
        }
    }

    /// POST JSON and hand back the response whatever its status, so the
    /// caller can interpret service-specific error payloads.
    pub async fn post_json_raw<B>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<RawResponse, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec(body).map_err(|e| HttpError::Build(e.to_string()))?;
        self.send(Method::POST, path, Some(bytes), opts).await
    }

    /// Join `path` onto the base, or parse it as absolute when detached.
    fn resolve(&self, path: &str) -> Result<Url, HttpError> {
        match &self.base {
            Some(base) => base.join(path),
            None => Url::parse(path),
        }
        .map_err(|e| HttpError::Url(e.to_string()))
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        opts: RequestOpts<'_>,
    ) -> Result<RawResponse, HttpError> {
        let url = self.resolve(path)?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);

        let bearer = match opts.auth {
            Some(Auth::Bearer(tok)) => Some(sanitize_api_key(tok)?),
            _ => None,
        };
        let auth_kind = opts.auth.as_ref().map_or("none", Auth::kind);
        let (host_path, redacted_q) = redact_query(&url);
        let req_id = Uuid::new_v4().simple().to_string();

        // ----- Build request -----
        let mut rb = self.inner.request(method.clone(), url.clone()).timeout(timeout);
        if let Some(ua) = &self.user_agent {
            rb = rb.header(USER_AGENT, ua.clone());
        }
        if let Some(bytes) = &body {
            rb = rb
                .header(CONTENT_TYPE, "application/json")
                .body(bytes.clone());
        }
        if let Some(tok) = &bearer {
            rb = rb.bearer_auth(tok);
        }

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%host_path,
            query=?redacted_q,
            timeout_ms=timeout.as_millis() as u64,
            auth_kind,
            has_body=%body.is_some(),
            "http.request.start"
        );

        if raw_enabled() {
            let mut shown = HeaderMap::new();
            if let Some(ua) = &self.user_agent {
                shown.insert(USER_AGENT, ua.clone());
            }
            if bearer.is_some() {
                shown.insert(AUTHORIZATION, HeaderValue::from_static("Bearer <redacted>"));
            }
            let curl = make_curl(&method, &url, &shown, body.as_deref());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = Instant::now();
        let resp = rb.send().await.map_err(|e| {
            tracing::warn!(req_id=%req_id, message=%e, "http.network_error.send");
            HttpError::Network(e.to_string())
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|e| {
            tracing::warn!(req_id=%req_id, message=%e, "http.network_error.body");
            HttpError::Network(e.to_string())
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let upstream_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%upstream_id,
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let truncated = bytes.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target: "http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        let snippet = snip_body(&bytes);
        tracing::trace!(req_id=%req_id, body_snippet=%snippet, "http.response.body_snippet");

        if !status.is_success() {
            tracing::warn!(
                req_id=%req_id,
                %status,
                x_request_id=%upstream_id,
                body_snippet=%snippet,
                "http.error"
            );
        }

        let request_id = if upstream_id == "-" { req_id } else { upstream_id };
        Ok(RawResponse {
            status,
            body: bytes.to_vec(),
            request_id,
        })
    }
}

// ==============================
// Helpers
// ==============================

fn extract_error_message(body: &[u8]) -> String {
    // {"error":{"message":"..."}}
    #[derive(Deserialize)]
    struct Nested {
        error: NestedDetail,
    }
    #[derive(Deserialize)]
    struct NestedDetail {
        message: String,
    }

    // {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Flat {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<Nested>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Flat>(body) {
        for candidate in [m.error, m.message, m.detail] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    snip_body(body)
}

fn truncate_chars(s: &str, max: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max) {
        Some((idx, _)) => Cow::Owned(format!("{}...", &s[..idx])),
        None => Cow::Borrowed(s),
    }
}

fn snip_body(body: &[u8]) -> String {
    truncate_chars(&String::from_utf8_lossy(body), SNIPPET_MAX).into_owned()
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    // Trim outer spaces/quotes, then drop any embedded ASCII whitespace.
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if s.is_empty() {
        return Err(HttpError::Build("API key is empty".into()));
    }
    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    HeaderValue::from_str(&format!("Bearer {s}"))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}

fn redact_query(url: &Url) -> (String, Vec<(String, String)>) {
    let host_path = format!("{}{}", url.host_str().unwrap_or("-"), url.path());
    let redacted = url
        .query_pairs()
        .map(|(k, v)| {
            let secret = is_secret_param(&k);
            (
                k.into_owned(),
                if secret {
                    "<redacted>".into()
                } else {
                    v.into_owned()
                },
            )
        })
        .collect::<Vec<_>>();
    (host_path, redacted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_keys() {
        assert_eq!(sanitize_api_key("  \"hf_abc def\"\n").unwrap(), "hf_abcdef");
        assert!(matches!(sanitize_api_key("   "), Err(HttpError::Build(_))));
        assert!(matches!(sanitize_api_key("hf_ß"), Err(HttpError::Build(_))));
    }

    #[test]
    fn error_messages_from_common_shapes() {
        assert_eq!(
            extract_error_message(br#"{"error":{"message":"bad key"}}"#),
            "bad key"
        );
        assert_eq!(
            extract_error_message(br#"{"error":"Model is currently loading","estimated_time":20.0}"#),
            "Model is currently loading"
        );
        assert_eq!(extract_error_message(br#"{"detail":"nope"}"#), "nope");
        assert_eq!(extract_error_message(b"plain text"), "plain text");
    }

    #[test]
    fn redacts_secret_query_params() {
        let url = Url::parse("https://h.example/p?token=abc&q=rust").unwrap();
        let (host_path, q) = redact_query(&url);
        assert_eq!(host_path, "h.example/p");
        assert_eq!(q[0], ("token".into(), "<redacted>".into()));
        assert_eq!(q[1], ("q".into(), "rust".into()));
    }

    #[test]
    fn curl_never_contains_bearer_token() {
        let url = Url::parse("https://h.example/models/x?api_key=secret").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer hf_secret"));
        let curl = make_curl(&Method::POST, &url, &headers, Some(br#"{"inputs":"hi"}"#));
        assert!(!curl.contains("hf_secret"));
        assert!(!curl.contains("api_key=secret"));
        assert!(curl.contains("<redacted>"));
    }

    #[test]
    fn snippets_respect_char_boundaries() {
        let body = "é".repeat(SNIPPET_MAX + 10);
        let snip = snip_body(body.as_bytes());
        assert!(snip.ends_with("..."));
        assert_eq!(snip.chars().count(), SNIPPET_MAX + 3);
    }

    #[test]
    fn detached_client_requires_absolute_urls() {
        let client = HttpClient::detached().unwrap();
        assert!(client.resolve("relative/path").is_err());
        assert!(client.resolve("https://example.com/a").is_ok());
    }

    #[test]
    fn anchored_client_joins_paths() {
        let client = HttpClient::new("https://api.example.com/").unwrap();
        let url = client.resolve("models/facebook/bart-large-cnn").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/models/facebook/bart-large-cnn"
        );
    }
}
