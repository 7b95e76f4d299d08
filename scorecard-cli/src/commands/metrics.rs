//! Metrics command - run the metrics scorecard generator directly

use clap::Args;
use scorecard_core::{Config, RepositoryCoordinate, Secrets};
use scorecard_github::ScorecardSource;

use super::build_generator;

/// Arguments for the metrics command
#[derive(Args, Debug)]
pub struct MetricsArgs {
    /// Repository (owner/repo or GitHub URL)
    pub repository: RepositoryCoordinate,
}

impl MetricsArgs {
    /// Execute the metrics command
    pub async fn execute(
        &self,
        verbose: bool,
        config: &Config,
        secrets: &Secrets,
    ) -> anyhow::Result<()> {
        if verbose {
            println!(
                "Fetching metrics for {} from {}...",
                self.repository, config.metrics.base_url
            );
        }

        let generator = build_generator(ScorecardSource::Metrics, config, secrets)?;
        let result = generator.generate_scorecard(&self.repository).await?;

        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }
}
