//! A scorecard conversation with a hosted agent

use std::collections::BTreeMap;
use std::time::Duration;

use scorecard_core::{
    scorecard_request, RepositoryCoordinate, ToolSet, Transcript, TranscriptEntry,
    AGENT_INSTRUCTIONS, AGENT_NAME,
};
use tracing::{info, warn};

use crate::models::{Agent, CreateAgent, ListOrder, MessageRole, Run, Thread};
use crate::{create_and_process, HostedAgent, Result};

/// An agent plus the thread it converses on
pub struct Session<'a, A: HostedAgent + ?Sized> {
    api: &'a A,
    tools: ToolSet,
    poll_interval: Duration,
    agent: Agent,
    thread: Thread,
}

impl<'a, A: HostedAgent + ?Sized> Session<'a, A> {
    /// Create the scorecard agent with `tools` registered, and a fresh thread
    ///
    /// If the thread cannot be created the agent is deleted again.
    pub async fn start(
        api: &'a A,
        model: &str,
        tools: ToolSet,
        poll_interval: Duration,
    ) -> Result<Self> {
        let request = CreateAgent {
            model: model.to_string(),
            name: AGENT_NAME.to_string(),
            instructions: AGENT_INSTRUCTIONS.trim().to_string(),
            tools: tools.definitions(),
            metadata: BTreeMap::from([
                ("created_by".to_string(), "devex-cli".to_string()),
                ("purpose".to_string(), "function_tool_demo".to_string()),
            ]),
        };

        let agent = api.create_agent(&request).await?;
        let thread = match api.create_thread().await {
            Ok(thread) => thread,
            Err(e) => {
                // the agent is useless without a thread
                if let Err(delete_err) = api.delete_agent(&agent.id).await {
                    warn!(agent_id = %agent.id, error = %delete_err, "Failed to delete agent");
                }
                return Err(e);
            }
        };
        info!(agent_id = %agent.id, thread_id = %thread.id, "Session started");

        Ok(Self {
            api,
            tools,
            poll_interval,
            agent,
            thread,
        })
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    /// Post `prompt` as the user and process the resulting run
    pub async fn ask(&self, prompt: &str) -> Result<Run> {
        self.api
            .create_message(&self.thread.id, MessageRole::User, prompt)
            .await?;

        create_and_process(
            self.api,
            &self.thread.id,
            &self.agent.id,
            &self.tools,
            self.poll_interval,
        )
        .await
    }

    /// Ask for the scorecard of `repo`
    pub async fn request_scorecard(&self, repo: &RepositoryCoordinate) -> Result<Run> {
        self.ask(&scorecard_request(repo)).await
    }

    /// The conversation so far, oldest first
    ///
    /// Messages without any text block are skipped.
    pub async fn transcript(&self) -> Result<Transcript> {
        let messages = self
            .api
            .list_messages(&self.thread.id, ListOrder::Ascending)
            .await?;

        Ok(messages
            .iter()
            .filter_map(|m| m.last_text().map(|text| TranscriptEntry::new(&m.role, text)))
            .collect())
    }

    /// Delete the agent from the service
    pub async fn close(self) -> Result<()> {
        self.api.delete_agent(&self.agent.id).await?;
        info!(agent_id = %self.agent.id, "Agent deleted");
        Ok(())
    }
}
