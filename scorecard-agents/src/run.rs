//! Driving a run to completion

use std::time::Duration;

use scorecard_core::ToolSet;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::models::{Run, RunStatus, ToolOutput};
use crate::{Error, HostedAgent, Result};

/// Start a run and process it until it reaches a terminal status
///
/// The run is polled every `poll_interval`. Whenever it stops on
/// `requires_action`, each requested tool call is executed against `tools`
/// (one after another) and the outputs are submitted in a single batch.
/// A failed run is returned as-is; the caller decides how to report it.
/// A status this client does not recognise ends processing with an error.
pub async fn create_and_process<A>(
    api: &A,
    thread_id: &str,
    agent_id: &str,
    tools: &ToolSet,
    poll_interval: Duration,
) -> Result<Run>
where
    A: HostedAgent + ?Sized,
{
    let mut run = api.create_run(thread_id, agent_id).await?;
    info!(run_id = %run.id, thread_id, "Run started");

    loop {
        debug!(run_id = %run.id, status = %run.status, "Run status");

        if run.status.is_terminal() {
            info!(run_id = %run.id, status = %run.status, "Run finished");
            return Ok(run);
        }

        if run.status == RunStatus::Unknown {
            // no way to tell whether it will ever finish
            return Err(Error::Run(format!(
                "run {} reported an unrecognised status",
                run.id
            )));
        }

        if run.status == RunStatus::RequiresAction {
            let outputs = execute_tool_calls(&run, tools).await?;
            run = api.submit_tool_outputs(thread_id, &run.id, &outputs).await?;
            continue;
        }

        tokio::time::sleep(poll_interval).await;
        run = api.get_run(thread_id, &run.id).await?;
    }
}

async fn execute_tool_calls(run: &Run, tools: &ToolSet) -> Result<Vec<ToolOutput>> {
    let calls = run.tool_calls();
    if calls.is_empty() {
        return Err(Error::Run(format!(
            "run {} requires action but requested no tool calls",
            run.id
        )));
    }

    let mut outputs = Vec::with_capacity(calls.len());
    for call in calls {
        let output = match &call.function {
            Some(function) => {
                info!(tool = %function.name, call_id = %call.id, "Executing tool call");
                tools.execute(&function.name, &function.arguments).await
            }
            None => {
                warn!(call_id = %call.id, kind = %call.kind, "Unsupported tool call type");
                json!({ "error": format!("Unsupported tool call type: {}", call.kind) })
                    .to_string()
            }
        };

        outputs.push(ToolOutput {
            tool_call_id: call.id.clone(),
            output,
        });
    }

    Ok(outputs)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{
        Agent, CreateAgent, FunctionCall, ListOrder, MessageContent, MessageRole, RequiredAction,
        RequiredToolCall, RunError, SubmitToolOutputsAction, TextContent, Thread, ThreadMessage,
    };
    use async_trait::async_trait;
    use scorecard_core::FunctionTool;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// In-memory agent service replaying a scripted sequence of run states
    #[derive(Default)]
    pub(crate) struct ScriptedAgent {
        pub runs: Mutex<VecDeque<Run>>,
        pub submitted: Mutex<Vec<ToolOutput>>,
        pub messages: Mutex<Vec<ThreadMessage>>,
        pub deleted: Mutex<Vec<String>>,
        pub polls: Mutex<usize>,
        pub fail_thread: bool,
    }

    impl ScriptedAgent {
        pub fn with_runs(runs: Vec<Run>) -> Self {
            Self {
                runs: Mutex::new(runs.into()),
                ..Default::default()
            }
        }

        fn next_run(&self) -> Result<Run> {
            self.runs
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| Error::Run("script exhausted".to_string()))
        }
    }

    #[async_trait]
    impl HostedAgent for ScriptedAgent {
        async fn create_agent(&self, request: &CreateAgent) -> Result<Agent> {
            Ok(Agent {
                id: "asst_1".to_string(),
                name: Some(request.name.clone()),
                model: Some(request.model.clone()),
            })
        }

        async fn delete_agent(&self, agent_id: &str) -> Result<()> {
            self.deleted.lock().unwrap().push(agent_id.to_string());
            Ok(())
        }

        async fn create_thread(&self) -> Result<Thread> {
            if self.fail_thread {
                return Err(Error::Api {
                    status: 500,
                    message: "thread store unavailable".to_string(),
                });
            }
            Ok(Thread {
                id: "thread_1".to_string(),
            })
        }

        async fn create_message(
            &self,
            _thread_id: &str,
            role: MessageRole,
            content: &str,
        ) -> Result<ThreadMessage> {
            let message = text_message(role.as_str(), content);
            self.messages.lock().unwrap().push(message.clone());
            Ok(message)
        }

        async fn create_run(&self, _thread_id: &str, _agent_id: &str) -> Result<Run> {
            self.next_run()
        }

        async fn get_run(&self, _thread_id: &str, _run_id: &str) -> Result<Run> {
            *self.polls.lock().unwrap() += 1;
            self.next_run()
        }

        async fn submit_tool_outputs(
            &self,
            _thread_id: &str,
            _run_id: &str,
            outputs: &[ToolOutput],
        ) -> Result<Run> {
            self.submitted.lock().unwrap().extend_from_slice(outputs);
            self.next_run()
        }

        async fn list_messages(
            &self,
            _thread_id: &str,
            _order: ListOrder,
        ) -> Result<Vec<ThreadMessage>> {
            Ok(self.messages.lock().unwrap().clone())
        }
    }

    pub(crate) fn text_message(role: &str, text: &str) -> ThreadMessage {
        ThreadMessage {
            id: format!("msg_{}", role),
            role: role.to_string(),
            content: vec![MessageContent::Text {
                text: TextContent {
                    value: text.to_string(),
                },
            }],
        }
    }

    pub(crate) fn run(status: RunStatus) -> Run {
        Run {
            id: "run_1".to_string(),
            status,
            required_action: None,
            last_error: None,
        }
    }

    pub(crate) fn requires_call(name: &str, arguments: &str) -> Run {
        Run {
            required_action: Some(RequiredAction {
                kind: "submit_tool_outputs".to_string(),
                submit_tool_outputs: Some(SubmitToolOutputsAction {
                    tool_calls: vec![RequiredToolCall {
                        id: "call_1".to_string(),
                        kind: "function".to_string(),
                        function: Some(FunctionCall {
                            name: name.to_string(),
                            arguments: arguments.to_string(),
                        }),
                    }],
                }),
            }),
            ..run(RunStatus::RequiresAction)
        }
    }

    pub(crate) struct Upper;

    #[async_trait]
    impl FunctionTool for Upper {
        fn name(&self) -> &'static str {
            "upper"
        }

        fn description(&self) -> &'static str {
            "Uppercase the text argument"
        }

        fn parameters(&self) -> Value {
            json!({ "type": "object", "properties": { "text": { "type": "string" } } })
        }

        async fn call(&self, arguments: Value) -> scorecard_core::Result<Value> {
            let text = scorecard_core::tool::required_str(&arguments, "text")?;
            Ok(json!({ "text": text.to_uppercase() }))
        }
    }

    #[tokio::test]
    async fn test_polls_until_completed() {
        let api = ScriptedAgent::with_runs(vec![
            run(RunStatus::Queued),
            run(RunStatus::InProgress),
            run(RunStatus::Completed),
        ]);

        let result = create_and_process(&api, "thread_1", "asst_1", &ToolSet::new(), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        assert_eq!(*api.polls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_executes_requested_tools() {
        let api = ScriptedAgent::with_runs(vec![
            requires_call("upper", r#"{"text":"score"}"#),
            run(RunStatus::Queued),
            run(RunStatus::Completed),
        ]);
        let tools = ToolSet::new().with(Box::new(Upper));

        let result = create_and_process(&api, "thread_1", "asst_1", &tools, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        let submitted = api.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].tool_call_id, "call_1");
        assert_eq!(submitted[0].output, r#"{"text":"SCORE"}"#);
    }

    #[tokio::test]
    async fn test_unknown_tool_reported_to_agent() {
        let api = ScriptedAgent::with_runs(vec![
            requires_call("missing", "{}"),
            run(RunStatus::Completed),
        ]);

        create_and_process(&api, "thread_1", "asst_1", &ToolSet::new(), Duration::ZERO)
            .await
            .unwrap();

        let submitted = api.submitted.lock().unwrap();
        let output: Value = serde_json::from_str(&submitted[0].output).unwrap();
        assert!(output["error"].as_str().unwrap().contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_failed_run_is_returned() {
        let failed = Run {
            last_error: Some(RunError {
                code: Some("server_error".to_string()),
                message: "boom".to_string(),
            }),
            ..run(RunStatus::Failed)
        };
        let api = ScriptedAgent::with_runs(vec![run(RunStatus::InProgress), failed]);

        let result = create_and_process(&api, "thread_1", "asst_1", &ToolSet::new(), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(result.last_error.unwrap().to_string(), "server_error: boom");
    }

    #[tokio::test]
    async fn test_unrecognised_status_stops_polling() {
        let api = ScriptedAgent::with_runs(vec![
            run(RunStatus::InProgress),
            run(RunStatus::Unknown),
            run(RunStatus::Unknown),
            run(RunStatus::Unknown),
        ]);

        let result =
            create_and_process(&api, "thread_1", "asst_1", &ToolSet::new(), Duration::ZERO).await;

        match result {
            Err(Error::Run(message)) => assert!(message.contains("unrecognised status")),
            other => panic!("expected run error, got {:?}", other),
        }
        assert_eq!(*api.polls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_requires_action_without_calls_is_error() {
        let api = ScriptedAgent::with_runs(vec![run(RunStatus::RequiresAction)]);

        let result =
            create_and_process(&api, "thread_1", "asst_1", &ToolSet::new(), Duration::ZERO).await;
        assert!(matches!(result, Err(Error::Run(_))));
    }
}
