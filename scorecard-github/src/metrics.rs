//! Repository metrics endpoint client

use std::sync::Arc;

use reqwest::StatusCode;
use scorecard_core::{GitHubConfig, MetricsConfig};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::contents::USER_AGENT;
use crate::trace::{FetchTrace, TracingTrace};
use crate::Result;

/// Metrics returned by the service, or an error record
///
/// Successful payloads are passed through without any schema check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricsResult {
    /// `{"error": "..."}`
    Error { error: String },
    /// Parsed response body, verbatim
    Metrics(Value),
}

impl MetricsResult {
    pub fn error(message: impl Into<String>) -> Self {
        MetricsResult::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, MetricsResult::Error { .. })
    }
}

/// Client for the metrics endpoint
#[derive(Clone)]
pub struct MetricsClient {
    http: reqwest::Client,
    base_url: Url,
    trace: Arc<dyn FetchTrace>,
}

impl MetricsClient {
    /// Create a client; the GitHub timeout setting applies here too
    pub fn new(config: &MetricsConfig, github: &GitHubConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = github.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
            trace: Arc::new(TracingTrace),
        })
    }

    /// Replace the diagnostic hook
    pub fn with_trace(mut self, trace: Arc<dyn FetchTrace>) -> Self {
        self.trace = trace;
        self
    }

    /// Fetch metrics for `repo_url`
    ///
    /// Sends `GET <base>?repo=<repo_url>` with the bearer token. A non-200
    /// status becomes `{"error": "Failed to fetch MCP metrics: <status>"}`;
    /// transport failures and unparsable 200 bodies are errors.
    pub async fn fetch_mcp_metrics(&self, repo_url: &str, token: &str) -> Result<MetricsResult> {
        let response = self
            .http
            .get(self.base_url.clone())
            .query(&[("repo", repo_url)])
            .bearer_auth(token)
            .send()
            .await?;

        let url = response.url().to_string();
        let status = response.status();
        let body = response.text().await;
        self.trace.on_response(
            &url,
            Some(status.as_u16()),
            body.as_deref().unwrap_or(""),
        );

        if status != StatusCode::OK {
            warn!(repo_url, status = status.as_u16(), "Metrics request failed");
            return Ok(MetricsResult::error(format!(
                "Failed to fetch MCP metrics: {}",
                status.as_u16()
            )));
        }

        // Passed through unchecked
        let metrics: Value = serde_json::from_str(&body?)?;
        Ok(MetricsResult::Metrics(metrics))
    }
}

impl std::fmt::Debug for MetricsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::trace::RecordingTrace;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) fn metrics_client_for(server: &MockServer) -> MetricsClient {
        let config = MetricsConfig {
            base_url: format!("{}/mcp/repos", server.uri()),
        };
        MetricsClient::new(&config, &GitHubConfig::default()).unwrap()
    }

    #[test]
    fn test_error_record_shape() {
        let result = MetricsResult::error("Failed to fetch MCP metrics: 503");
        assert!(result.is_error());
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "error": "Failed to fetch MCP metrics: 503" })
        );
    }

    #[tokio::test]
    async fn test_success_returns_body_verbatim() {
        let server = MockServer::start().await;
        let body = json!({ "stars": 42, "open_issues": 3, "nested": { "ci": "passing" } });
        Mock::given(method("GET"))
            .and(path("/mcp/repos"))
            .and(query_param("repo", "https://github.com/octocat/Hello-World"))
            .and(header("authorization", "Bearer ghp_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let result = metrics_client_for(&server)
            .fetch_mcp_metrics("https://github.com/octocat/Hello-World", "ghp_test")
            .await
            .unwrap();

        assert_eq!(result, MetricsResult::Metrics(body));
    }

    #[tokio::test]
    async fn test_503_is_error_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let trace = RecordingTrace::new();
        let result = metrics_client_for(&server)
            .with_trace(Arc::new(trace.clone()))
            .fetch_mcp_metrics("https://github.com/octocat/Hello-World", "ghp_test")
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "error": "Failed to fetch MCP metrics: 503" })
        );
        assert_eq!(trace.calls()[0].status, Some(503));
    }

    #[tokio::test]
    async fn test_repo_url_is_query_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        metrics_client_for(&server)
            .fetch_mcp_metrics("https://github.com/a&b/c d", "t")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let pairs: Vec<(String, String)> = requests[0]
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![("repo".to_string(), "https://github.com/a&b/c d".to_string())]
        );
    }

    #[tokio::test]
    async fn test_unparsable_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let result = metrics_client_for(&server)
            .fetch_mcp_metrics("https://github.com/octocat/Hello-World", "t")
            .await;
        assert!(result.is_err());
    }
}
