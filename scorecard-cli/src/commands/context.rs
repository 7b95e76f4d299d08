//! Context command - fetch the scorecard files of a repository directly

use clap::Args;
use scorecard_core::{Config, RepositoryCoordinate, Secrets};
use scorecard_github::ContentsClient;

/// Arguments for the context command
#[derive(Args, Debug)]
pub struct ContextArgs {
    /// Repository (owner/repo or GitHub URL)
    pub repository: RepositoryCoordinate,
}

impl ContextArgs {
    /// Execute the context command
    pub async fn execute(
        &self,
        verbose: bool,
        config: &Config,
        secrets: &Secrets,
    ) -> anyhow::Result<()> {
        let client = ContentsClient::new(&config.github, secrets.github_token())?;

        if verbose {
            println!(
                "Fetching repository context for {} ({})...",
                self.repository,
                if client.is_authenticated() {
                    "authenticated"
                } else {
                    "unauthenticated"
                }
            );
        }

        let context = client
            .fetch_repo_context(self.repository.owner(), self.repository.repo())
            .await?;

        println!("{}", serde_json::to_string_pretty(&context)?);
        Ok(())
    }
}
