//! Run command - generate a scorecard through the hosted agent

use std::io::{self, Write};

use anyhow::Context as _;
use clap::Args;
use scorecard_agents::{AgentsClient, HostedAgent, RunStatus, Session};
use scorecard_core::{Config, RepositoryCoordinate, Secrets, ToolSet};

use super::{build_generator, SourceArg};

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// GitHub owner (prompted for when omitted)
    #[arg(long)]
    pub owner: Option<String>,

    /// GitHub repository name (prompted for when omitted)
    #[arg(long)]
    pub repo: Option<String>,

    /// Data source the scorecard tool reads
    #[arg(short, long, value_enum, default_value_t = SourceArg::Context)]
    pub source: SourceArg,

    /// Delete the agent from the service when the session ends
    #[arg(long)]
    pub cleanup: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        verbose: bool,
        config: &Config,
        secrets: &Secrets,
    ) -> anyhow::Result<()> {
        let endpoint = config.require_project_endpoint()?;
        let model = config.require_model_deployment()?;
        let token = secrets.agent_token().ok_or_else(|| {
            anyhow::anyhow!(
                "AGENTS_TOKEN not found. Set it in your .env file \
                 or add [agent] token to ~/.config/devex/secrets.toml"
            )
        })?;

        let client = AgentsClient::new(endpoint, &config.agent.api_version, token)?;
        println!("Project endpoint: {}", endpoint);

        let generator = build_generator(self.source.into(), config, secrets)?;
        let tools = ToolSet::new().with(Box::new(generator));

        if verbose {
            tracing::info!(
                model,
                source = ?self.source,
                tools = ?tools.names(),
                "Creating agent"
            );
        }

        let session = Session::start(&client, model, tools, config.agent.poll_interval)
            .await
            .context("Failed to start agent session")?;

        println!(
            "Using agent: {} (id: {})",
            session.agent().name.as_deref().unwrap_or("(unnamed)"),
            session.agent().id
        );

        self.converse_and_cleanup(session, verbose).await
    }

    /// Run the conversation, then delete the agent if asked to
    ///
    /// Cleanup happens whether or not the conversation succeeded; its
    /// outcome is what gets returned.
    async fn converse_and_cleanup<A>(
        &self,
        session: Session<'_, A>,
        verbose: bool,
    ) -> anyhow::Result<()>
    where
        A: HostedAgent + ?Sized,
    {
        let outcome = self.converse(&session).await;

        if self.cleanup {
            match session.close().await {
                Ok(()) => {
                    if verbose {
                        println!("Agent deleted");
                    }
                }
                // keep the original failure, it is the one worth reporting
                Err(e) if outcome.is_err() => {
                    tracing::warn!(error = %e, "Failed to delete agent");
                }
                Err(e) => return Err(e).context("Failed to delete agent"),
            }
        }

        outcome
    }

    async fn converse<A>(&self, session: &Session<'_, A>) -> anyhow::Result<()>
    where
        A: HostedAgent + ?Sized,
    {
        println!();
        println!("Enter repository details for scorecard generation:");
        let owner = match &self.owner {
            Some(owner) => owner.clone(),
            None => prompt_line("Enter GitHub owner: ")?,
        };
        let repo = match &self.repo {
            Some(repo) => repo.clone(),
            None => prompt_line("Enter GitHub repository name: ")?,
        };
        let repository = RepositoryCoordinate::new(owner, repo)?;

        let run = session.request_scorecard(&repository).await?;

        match run.status {
            RunStatus::Completed => {}
            RunStatus::Failed => {
                let reason = run
                    .last_error
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "unknown error".to_string());
                println!("Run failed: {}", reason);
            }
            other => println!("Run ended with status: {}", other),
        }

        let transcript = session.transcript().await?;

        println!();
        println!("Conversation Log:");
        println!();
        let mut stdout = io::stdout().lock();
        transcript.write_to(&mut stdout)?;
        if let Some(badge) = transcript.score_badge() {
            badge.write_to(&mut stdout)?;
        }

        Ok(())
    }
}

fn prompt_line(label: &str) -> anyhow::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scorecard_agents::{
        Agent, CreateAgent, Error, ListOrder, MessageRole, Run, Thread, ThreadMessage, ToolOutput,
    };
    use std::sync::Mutex;
    use std::time::Duration;

    /// Agent service that accepts the agent and thread but fails every message
    #[derive(Default)]
    struct BrokenMessages {
        deleted: Mutex<Vec<String>>,
    }

    fn unavailable<T>() -> scorecard_agents::Result<T> {
        Err(Error::Api {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }

    #[async_trait]
    impl HostedAgent for BrokenMessages {
        async fn create_agent(&self, request: &CreateAgent) -> scorecard_agents::Result<Agent> {
            Ok(Agent {
                id: "asst_1".to_string(),
                name: Some(request.name.clone()),
                model: Some(request.model.clone()),
            })
        }

        async fn delete_agent(&self, agent_id: &str) -> scorecard_agents::Result<()> {
            self.deleted.lock().unwrap().push(agent_id.to_string());
            Ok(())
        }

        async fn create_thread(&self) -> scorecard_agents::Result<Thread> {
            Ok(Thread {
                id: "thread_1".to_string(),
            })
        }

        async fn create_message(
            &self,
            _thread_id: &str,
            _role: MessageRole,
            _content: &str,
        ) -> scorecard_agents::Result<ThreadMessage> {
            unavailable()
        }

        async fn create_run(
            &self,
            _thread_id: &str,
            _agent_id: &str,
        ) -> scorecard_agents::Result<Run> {
            unavailable()
        }

        async fn get_run(&self, _thread_id: &str, _run_id: &str) -> scorecard_agents::Result<Run> {
            unavailable()
        }

        async fn submit_tool_outputs(
            &self,
            _thread_id: &str,
            _run_id: &str,
            _outputs: &[ToolOutput],
        ) -> scorecard_agents::Result<Run> {
            unavailable()
        }

        async fn list_messages(
            &self,
            _thread_id: &str,
            _order: ListOrder,
        ) -> scorecard_agents::Result<Vec<ThreadMessage>> {
            unavailable()
        }
    }

    fn args(owner: &str, cleanup: bool) -> RunArgs {
        RunArgs {
            owner: Some(owner.to_string()),
            repo: Some("Hello-World".to_string()),
            source: SourceArg::Context,
            cleanup,
        }
    }

    async fn start(api: &BrokenMessages) -> Session<'_, BrokenMessages> {
        Session::start(api, "gpt-4o", ToolSet::new(), Duration::ZERO)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_cleanup_after_invalid_repository() {
        let api = BrokenMessages::default();
        let session = start(&api).await;

        let result = args("", true).converse_and_cleanup(session, false).await;

        assert!(result.unwrap_err().to_string().contains("owner must not be empty"));
        assert_eq!(*api.deleted.lock().unwrap(), vec!["asst_1".to_string()]);
    }

    #[tokio::test]
    async fn test_cleanup_after_service_failure() {
        let api = BrokenMessages::default();
        let session = start(&api).await;

        let result = args("octocat", true).converse_and_cleanup(session, false).await;

        assert!(result.unwrap_err().to_string().contains("service unavailable"));
        assert_eq!(*api.deleted.lock().unwrap(), vec!["asst_1".to_string()]);
    }

    #[tokio::test]
    async fn test_agent_kept_without_cleanup() {
        let api = BrokenMessages::default();
        let session = start(&api).await;

        let result = args("octocat", false).converse_and_cleanup(session, false).await;

        assert!(result.is_err());
        assert!(api.deleted.lock().unwrap().is_empty());
    }
}
