//! REST client for the agent service

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use crate::models::{
    Agent, CreateAgent, ListOrder, ListResponse, MessageRole, Run, Thread, ThreadMessage,
    ToolOutput,
};
use crate::{Error, Result};

/// Operations of the hosted agent service
///
/// [`AgentsClient`] is the HTTP implementation; tests drive the run loop
/// against in-memory implementations.
#[async_trait]
pub trait HostedAgent: Send + Sync {
    /// Register an agent with its tools
    async fn create_agent(&self, request: &CreateAgent) -> Result<Agent>;

    /// Remove an agent
    async fn delete_agent(&self, agent_id: &str) -> Result<()>;

    /// Start an empty conversation thread
    async fn create_thread(&self) -> Result<Thread>;

    /// Append a message to a thread
    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage>;

    /// Start running `agent_id` on a thread
    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<Run>;

    /// Current state of a run
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// Answer the tool calls a run is waiting on
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run>;

    /// Every message on a thread
    async fn list_messages(&self, thread_id: &str, order: ListOrder) -> Result<Vec<ThreadMessage>>;
}

/// HTTP client for a project endpoint of the agent service
#[derive(Clone)]
pub struct AgentsClient {
    http: reqwest::Client,
    endpoint: Url,
    api_version: String,
    token: String,
}

impl AgentsClient {
    /// Create a client for `endpoint`, authenticating with a bearer token
    pub fn new(
        endpoint: &str,
        api_version: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::Url(format!(
                "{} cannot be used as a project endpoint",
                endpoint
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("devex-scorecard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(endpoint = %endpoint, "Created agent service client");

        Ok(Self {
            http,
            endpoint,
            api_version: api_version.into(),
            token: token.into(),
        })
    }

    /// Project endpoint this client talks to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Url(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();

        if !status.is_success() {
            // Error bodies are usually {"error": {"message": ...}}
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            return Err(Error::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        Ok(response.json().await?)
    }
}

impl std::fmt::Debug for AgentsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentsClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

/// Pull `error.message` out of an error body, or fall back to the raw text
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .and_then(|m| m.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl HostedAgent for AgentsClient {
    async fn create_agent(&self, request: &CreateAgent) -> Result<Agent> {
        let url = self.url(&["assistants"])?;
        let agent: Agent = self.send(self.http.post(url).json(request)).await?;
        debug!(agent_id = %agent.id, "Created agent");
        Ok(agent)
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<()> {
        let url = self.url(&["assistants", agent_id])?;
        // Body is a deletion status we don't need
        let _: Value = self.send(self.http.delete(url)).await?;
        debug!(agent_id, "Deleted agent");
        Ok(())
    }

    async fn create_thread(&self) -> Result<Thread> {
        let url = self.url(&["threads"])?;
        let thread: Thread = self.send(self.http.post(url).json(&json!({}))).await?;
        debug!(thread_id = %thread.id, "Created thread");
        Ok(thread)
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage> {
        let url = self.url(&["threads", thread_id, "messages"])?;
        let body = json!({ "role": role, "content": content });
        self.send(self.http.post(url).json(&body)).await
    }

    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<Run> {
        let url = self.url(&["threads", thread_id, "runs"])?;
        let body = json!({ "assistant_id": agent_id });
        self.send(self.http.post(url).json(&body)).await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let url = self.url(&["threads", thread_id, "runs", run_id])?;
        self.send(self.http.get(url)).await
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run> {
        let url = self.url(&["threads", thread_id, "runs", run_id, "submit_tool_outputs"])?;
        let body = json!({ "tool_outputs": outputs });
        self.send(self.http.post(url).json(&body)).await
    }

    async fn list_messages(&self, thread_id: &str, order: ListOrder) -> Result<Vec<ThreadMessage>> {
        let mut messages = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut url = self.url(&["threads", thread_id, "messages"])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("order", order.as_str());
                if let Some(cursor) = &after {
                    query.append_pair("after", cursor);
                }
            }

            // Follow the cursor until the service says there is nothing left
            let page: ListResponse<ThreadMessage> = self.send(self.http.get(url)).await?;
            messages.extend(page.data);

            match (page.has_more, page.last_id) {
                (true, Some(last_id)) => after = Some(last_id),
                _ => break,
            }
        }

        Ok(messages)
    }
}
