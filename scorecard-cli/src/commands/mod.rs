//! CLI command implementations

pub mod context;
pub mod metrics;
pub mod run;

pub use context::ContextArgs;
pub use metrics::MetricsArgs;
pub use run::RunArgs;

use clap::ValueEnum;
use scorecard_core::{Config, Secrets};
use scorecard_github::{ContentsClient, MetricsClient, ScorecardGenerator, ScorecardSource};

/// Data source for the scorecard tool
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum SourceArg {
    /// README.md and CODEOWNERS from the contents API
    #[default]
    Context,
    /// Repository metrics service
    Metrics,
}

impl From<SourceArg> for ScorecardSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Context => ScorecardSource::Context,
            SourceArg::Metrics => ScorecardSource::Metrics,
        }
    }
}

/// Build the `generate_scorecard` callback for `source`
pub fn build_generator(
    source: ScorecardSource,
    config: &Config,
    secrets: &Secrets,
) -> anyhow::Result<ScorecardGenerator> {
    let token = secrets.github_token();

    let generator = match source {
        ScorecardSource::Context => {
            if token.is_none() {
                tracing::warn!("GITHUB_TOKEN not set, fetching repository files unauthenticated");
            }
            ScorecardGenerator::Context(ContentsClient::new(&config.github, token)?)
        }
        ScorecardSource::Metrics => ScorecardGenerator::Metrics {
            client: MetricsClient::new(&config.metrics, &config.github)?,
            token,
        },
    };

    Ok(generator)
}
