//! Scorecard Agents - client for the hosted agent service
//!
//! The hosted service owns the conversation: it stores agents, threads and
//! messages, and executes runs. While a run is in progress it may ask the
//! caller to execute function tools; [`create_and_process`] answers those
//! requests from a [`scorecard_core::ToolSet`] until the run finishes.

mod client;
mod error;
mod models;
mod run;
mod session;

pub use client::{AgentsClient, HostedAgent};
pub use error::{Error, Result};
pub use models::{
    Agent, CreateAgent, FunctionCall, ListOrder, MessageContent, MessageRole, RequiredAction,
    RequiredToolCall, Run, RunError, RunStatus, SubmitToolOutputsAction, TextContent, Thread,
    ThreadMessage, ToolOutput,
};
pub use run::create_and_process;
pub use session::Session;
