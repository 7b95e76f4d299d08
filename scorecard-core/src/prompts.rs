//! Prompt text for the scorecard agent

use crate::RepositoryCoordinate;

/// Display name of the agent created for a session
pub const AGENT_NAME: &str = "DevEx Scorecard Generator Agent";

/// System instructions for the scorecard agent
pub const AGENT_INSTRUCTIONS: &str = include_str!("prompts/instructions.md");

const SCORECARD_REQUEST: &str = include_str!("prompts/scorecard_request.md");

/// The user message asking for a scorecard of `repo`
///
/// `{{REPO}}` is substituted once, so text inside the coordinate is never
/// treated as a placeholder.
pub fn scorecard_request(repo: &RepositoryCoordinate) -> String {
    SCORECARD_REQUEST
        .trim()
        .replacen("{{REPO}}", &repo.to_string(), 1)
}
