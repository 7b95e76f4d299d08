//! Repository contents endpoint client
//!
//! `GET /repos/{owner}/{repo}/contents/{path}` returns file metadata with the
//! body base64-encoded in `content`. Missing or unreadable files are reported
//! as a sentinel string rather than an error.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use scorecard_core::GitHubConfig;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::trace::{FetchTrace, TracingTrace};
use crate::{Error, Result};

pub(crate) const USER_AGENT: &str = concat!("devex-scorecard/", env!("CARGO_PKG_VERSION"));

/// Response from the contents API (only the fields we read)
#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

/// Text substituted for a file that could not be fetched
pub fn not_found_sentinel(filename: &str) -> String {
    format!("{} not found or inaccessible.", filename)
}

/// Client for the repository contents endpoint
#[derive(Clone)]
pub struct ContentsClient {
    http: reqwest::Client,
    api_base: Url,
    token: Option<String>,
    trace: Arc<dyn FetchTrace>,
}

impl ContentsClient {
    /// Create a client from configuration
    ///
    /// Without a token requests are sent unauthenticated.
    pub fn new(config: &GitHubConfig, token: Option<String>) -> Result<Self> {
        let api_base = Url::parse(&config.api_base)?;
        if api_base.cannot_be_a_base() {
            return Err(Error::Url(format!(
                "{} cannot be used as an API base",
                config.api_base
            )));
        }

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            api_base,
            token: token.filter(|t| !t.trim().is_empty()),
            trace: Arc::new(TracingTrace),
        })
    }

    /// Replace the diagnostic hook
    pub fn with_trace(mut self, trace: Arc<dyn FetchTrace>) -> Self {
        self.trace = trace;
        self
    }

    /// Whether requests carry an `Authorization` header
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// URL of `filename` in `owner/repo`
    ///
    /// Every part is percent-encoded as a path segment; `/` inside `filename`
    /// keeps separating directories. Empty, `.` and `..` segments are
    /// rejected since they would change which resource is requested.
    pub fn contents_url(&self, owner: &str, repo: &str, filename: &str) -> Result<Url> {
        let file_segments: Vec<&str> = filename.split('/').collect();
        for segment in [owner, repo].iter().chain(&file_segments) {
            if matches!(*segment, "" | "." | "..") {
                return Err(Error::Url(format!(
                    "invalid path segment {:?} in {}/{}/{}",
                    segment, owner, repo, filename
                )));
            }
        }

        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Url(format!("{} cannot be used as an API base", self.api_base)))?
            .pop_if_empty()
            .extend(["repos", owner, repo, "contents"])
            .extend(file_segments);
        Ok(url)
    }

    /// Fetch one file as text
    ///
    /// Any non-200 status, or a request that never got a response, yields
    /// [`not_found_sentinel`]. A 200 whose body lacks `content` or does not
    /// decode to UTF-8 text is an error.
    pub async fn fetch_file(&self, owner: &str, repo: &str, filename: &str) -> Result<String> {
        let url = self.contents_url(owner, repo, filename)?;

        let mut request = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "Contents request failed");
                self.trace.on_response(url.as_str(), None, "");
                return Ok(not_found_sentinel(filename));
            }
        };

        let status = response.status();
        let body = response.text().await;
        self.trace.on_response(
            url.as_str(),
            Some(status.as_u16()),
            body.as_deref().unwrap_or(""),
        );

        if status != StatusCode::OK {
            debug!(filename, status = status.as_u16(), "File not available");
            return Ok(not_found_sentinel(filename));
        }

        decode_content(&body?)
    }
}

impl std::fmt::Debug for ContentsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentsClient")
            .field("api_base", &self.api_base.as_str())
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

/// Decode the base64 `content` field of a contents response
fn decode_content(body: &str) -> Result<String> {
    let response: ContentResponse = serde_json::from_str(body)?;

    if let Some(encoding) = response.encoding.as_deref() {
        if encoding != "base64" {
            warn!(encoding, "Unexpected content encoding, decoding as base64");
        }
    }

    let content = response
        .content
        .ok_or_else(|| Error::Decode("response has no content field".to_string()))?;

    // the API wraps the payload at 60 columns
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::Decode(format!("content is not valid base64: {}", e)))?;

    String::from_utf8(bytes)
        .map_err(|e| Error::Decode(format!("content is not valid UTF-8: {}", e)))
}
