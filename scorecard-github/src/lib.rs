//! Scorecard GitHub - repository data behind the scorecard tool
//!
//! This crate fetches the files and metrics a developer experience scorecard
//! is built from, and exposes the `generate_scorecard` function tool the
//! hosted agent calls.

mod contents;
mod context;
mod error;
mod metrics;
mod scorecard;
pub mod trace;

pub use contents::{not_found_sentinel, ContentsClient};
pub use context::{RepositoryContext, CONTEXT_FILES};
pub use error::{Error, Result};
pub use metrics::{MetricsClient, MetricsResult};
pub use scorecard::{ScorecardGenerator, ScorecardResult, ScorecardSource, MISSING_TOKEN_MESSAGE};
pub use trace::{FetchTrace, RecordingTrace, TracingTrace};
