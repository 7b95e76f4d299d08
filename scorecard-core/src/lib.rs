//! Scorecard Core - shared building blocks for the DevEx scorecard demo
//!
//! This crate holds the pieces every other crate leans on: configuration and
//! secrets loading, repository coordinates, the function-tool abstraction the
//! hosted agent calls back into, prompt templates and transcript rendering.

pub mod config;
pub mod error;
pub mod prompts;
pub mod repository;
pub mod secrets;
pub mod tool;
pub mod transcript;

pub use config::{AgentConfig, Config, GitHubConfig, MetricsConfig};
pub use error::{Error, Result};
pub use prompts::{scorecard_request, AGENT_INSTRUCTIONS, AGENT_NAME};
pub use repository::RepositoryCoordinate;
pub use secrets::Secrets;
pub use tool::{FunctionDefinition, FunctionTool, ToolDefinition, ToolSet};
pub use transcript::{ScoreBadge, Transcript, TranscriptEntry};
