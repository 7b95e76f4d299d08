//! Scorecard generators exposed to the hosted agent
//!
//! Two generators back the same `generate_scorecard` function tool:
//! - [`ScorecardGenerator::Context`] reads README.md and CODEOWNERS
//! - [`ScorecardGenerator::Metrics`] asks the metrics service about the repo

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use scorecard_core::tool::required_str;
use scorecard_core::{FunctionTool, RepositoryCoordinate};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{ContentsClient, MetricsClient, MetricsResult, RepositoryContext, Result};

/// Error returned by the metrics generator when no credential is available
pub const MISSING_TOKEN_MESSAGE: &str =
    "GITHUB_TOKEN not found in environment. Please set it in your .env file.";

/// Payload handed back to the agent
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScorecardResult {
    Context(RepositoryContext),
    Metrics(MetricsResult),
}

/// Which data source a scorecard is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScorecardSource {
    /// Repository files via the contents endpoint
    #[default]
    Context,
    /// The metrics service
    Metrics,
}

impl ScorecardSource {
    pub fn name(&self) -> &'static str {
        match self {
            ScorecardSource::Context => "context",
            ScorecardSource::Metrics => "metrics",
        }
    }
}

impl fmt::Display for ScorecardSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ScorecardSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "context" | "files" => Ok(ScorecardSource::Context),
            "metrics" | "mcp" => Ok(ScorecardSource::Metrics),
            _ => Err(format!("Unknown scorecard source: {}", s)),
        }
    }
}

/// The `generate_scorecard` callback
#[derive(Debug, Clone)]
pub enum ScorecardGenerator {
    /// Returns the repository context mapping unmodified
    Context(ContentsClient),
    /// Returns the metrics result; the token is checked before any request
    Metrics {
        client: MetricsClient,
        token: Option<String>,
    },
}

impl ScorecardGenerator {
    /// Which source this generator reads
    pub fn source(&self) -> ScorecardSource {
        match self {
            ScorecardGenerator::Context(_) => ScorecardSource::Context,
            ScorecardGenerator::Metrics { .. } => ScorecardSource::Metrics,
        }
    }

    /// Produce the scorecard payload for `repo`
    pub async fn generate_scorecard(&self, repo: &RepositoryCoordinate) -> Result<ScorecardResult> {
        info!(repo = %repo, source = %self.source(), "Generating scorecard");

        match self {
            ScorecardGenerator::Context(client) => {
                let context = client.fetch_repo_context(repo.owner(), repo.repo()).await?;
                Ok(ScorecardResult::Context(context))
            }
            ScorecardGenerator::Metrics { client, token } => {
                let Some(token) = token.as_deref().map(str::trim).filter(|t| !t.is_empty())
                else {
                    warn!("No GitHub token available for metrics request");
                    return Ok(ScorecardResult::Metrics(MetricsResult::error(
                        MISSING_TOKEN_MESSAGE,
                    )));
                };

                let metrics = client.fetch_mcp_metrics(&repo.html_url(), token).await?;
                Ok(ScorecardResult::Metrics(metrics))
            }
        }
    }
}

#[async_trait]
impl FunctionTool for ScorecardGenerator {
    fn name(&self) -> &'static str {
        "generate_scorecard"
    }

    fn description(&self) -> &'static str {
        match self {
            ScorecardGenerator::Context(_) => {
                "Fetch the README.md and CODEOWNERS files of a GitHub repository \
                 to generate a developer experience scorecard."
            }
            ScorecardGenerator::Metrics { .. } => {
                "Fetch repository metrics for a GitHub repository \
                 to generate a developer experience scorecard."
            }
        }
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "owner": {
                    "type": "string",
                    "description": "GitHub user or organization that owns the repository"
                },
                "repo": {
                    "type": "string",
                    "description": "Repository name"
                }
            },
            "required": ["owner", "repo"]
        })
    }

    async fn call(&self, arguments: Value) -> scorecard_core::Result<Value> {
        let repo = RepositoryCoordinate::new(
            required_str(&arguments, "owner")?,
            required_str(&arguments, "repo")?,
        )?;

        let result = self.generate_scorecard(&repo).await?;
        Ok(serde_json::to_value(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contents::tests::{client_for, content_body};
    use crate::metrics::tests::metrics_client_for;
    use scorecard_core::ToolSet;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hello_world() -> RepositoryCoordinate {
        RepositoryCoordinate::new("octocat", "Hello-World").unwrap()
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!(
            "context".parse::<ScorecardSource>(),
            Ok(ScorecardSource::Context)
        );
        assert_eq!(
            "METRICS".parse::<ScorecardSource>(),
            Ok(ScorecardSource::Metrics)
        );
        assert!("other".parse::<ScorecardSource>().is_err());
        assert_eq!(ScorecardSource::default().to_string(), "context");
    }

    #[tokio::test]
    async fn test_context_generator_returns_context() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/contents/README.md"))
            .respond_with(ResponseTemplate::new(200).set_body_json(content_body("# Hello")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/contents/CODEOWNERS"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let generator = ScorecardGenerator::Context(client_for(&server, None));
        let result = generator.generate_scorecard(&hello_world()).await.unwrap();

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "README.md": "# Hello",
                "CODEOWNERS": "CODEOWNERS not found or inaccessible."
            })
        );
    }

    #[tokio::test]
    async fn test_metrics_generator_without_token_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        for token in [None, Some(String::new()), Some("  ".to_string())] {
            let generator = ScorecardGenerator::Metrics {
                client: metrics_client_for(&server),
                token,
            };
            let result = generator.generate_scorecard(&hello_world()).await.unwrap();
            assert_eq!(
                serde_json::to_value(&result).unwrap(),
                json!({
                    "error": "GITHUB_TOKEN not found in environment. Please set it in your .env file."
                })
            );
        }
    }

    #[tokio::test]
    async fn test_metrics_generator_returns_metrics() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mcp/repos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "score": 7 })))
            .mount(&server)
            .await;

        let generator = ScorecardGenerator::Metrics {
            client: metrics_client_for(&server),
            token: Some("ghp_test".to_string()),
        };
        let result = generator.generate_scorecard(&hello_world()).await.unwrap();
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "score": 7 }));

        let requests = server.received_requests().await.unwrap();
        let repo_param = requests[0]
            .url
            .query_pairs()
            .find(|(k, _)| k == "repo")
            .map(|(_, v)| v.into_owned());
        assert_eq!(
            repo_param.as_deref(),
            Some("https://github.com/octocat/Hello-World")
        );
    }

    #[tokio::test]
    async fn test_metrics_generator_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let generator = ScorecardGenerator::Metrics {
            client: metrics_client_for(&server),
            token: Some("ghp_test".to_string()),
        };
        let result = generator.generate_scorecard(&hello_world()).await.unwrap();
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "error": "Failed to fetch MCP metrics: 503" })
        );
    }

    #[tokio::test]
    async fn test_tool_call_through_toolset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tools = ToolSet::new().with(Box::new(ScorecardGenerator::Context(client_for(
            &server, None,
        ))));
        assert_eq!(tools.names(), vec!["generate_scorecard"]);

        let output = tools
            .execute(
                "generate_scorecard",
                r#"{"owner":"octocat","repo":"Hello-World"}"#,
            )
            .await;
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["CODEOWNERS"], "CODEOWNERS not found or inaccessible.");
        assert_eq!(value["README.md"], "README.md not found or inaccessible.");
    }

    #[tokio::test]
    async fn test_tool_call_malformed_response_aborts_invocation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "type": "dir" })))
            .mount(&server)
            .await;

        let tools = ToolSet::new().with(Box::new(ScorecardGenerator::Context(client_for(
            &server, None,
        ))));
        let output = tools
            .execute("generate_scorecard", r#"{"owner":"octocat","repo":"Hello-World"}"#)
            .await;
        let value: Value = serde_json::from_str(&output).unwrap();
        assert!(value["error"].as_str().unwrap().contains("no content field"));
    }

    #[tokio::test]
    async fn test_tool_call_rejects_blank_owner() {
        let generator = ScorecardGenerator::Metrics {
            client: metrics_client_for(&MockServer::start().await),
            token: None,
        };
        let err = generator
            .call(json!({ "owner": "", "repo": "Hello-World" }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("owner must not be empty"));
    }

    #[test]
    fn test_tool_schema() {
        let generator = ScorecardGenerator::Context(
            ContentsClient::new(&scorecard_core::GitHubConfig::default(), None).unwrap(),
        );
        let schema = generator.parameters();
        assert_eq!(schema["required"], json!(["owner", "repo"]));
        assert!(generator.description().contains("CODEOWNERS"));
    }
}
