//! DevEx CLI - developer experience scorecards from a hosted agent
//!
//! Registers the `generate_scorecard` function tool with a hosted agent,
//! asks it to score a GitHub repository and prints the conversation.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use scorecard_core::{Config, Secrets};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{ContextArgs, MetricsArgs, RunArgs};

/// DevEx: developer experience scorecards for GitHub repositories
#[derive(Parser, Debug)]
#[command(name = "devex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.config/devex/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Agent service project endpoint (overrides config and env)
    #[arg(long, global = true)]
    project_endpoint: Option<String>,

    /// Model deployment name (overrides config and env)
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Generate a scorecard through the hosted agent
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Fetch README.md and CODEOWNERS for a repository
    Context(ContextArgs),

    /// Fetch repository metrics
    Metrics(MetricsArgs),

    /// Show current configuration
    Config,

    /// Create a secrets file template
    InitSecrets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so RUST_LOG and tokens from it apply
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "info,scorecard_github=debug,scorecard_agents=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    match &dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Failed to load .env file"),
    }

    let config = Config::load_with_overrides(
        cli.config.as_deref(),
        cli.project_endpoint.clone(),
        cli.model.clone(),
    )?;

    if cli.verbose {
        tracing::info!(
            project_endpoint = ?config.agent.project_endpoint,
            model = ?config.agent.model_deployment,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("devex {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Run(args)) => {
            let secrets = Secrets::load()?;
            args.execute(cli.verbose, &config, &secrets).await?;
        }
        Some(Commands::Context(args)) => {
            let secrets = Secrets::load()?;
            args.execute(cli.verbose, &config, &secrets).await?;
        }
        Some(Commands::Metrics(args)) => {
            let secrets = Secrets::load()?;
            args.execute(cli.verbose, &config, &secrets).await?;
        }
        Some(Commands::Config) => {
            let secrets = Secrets::load()?;
            let set = |token: Option<String>| if token.is_some() { "(set)" } else { "(not set)" };

            println!("DevEx Configuration");
            println!("===================");
            println!();
            println!("GitHub:");
            println!("  api_base: {}", config.github.api_base);
            println!("  token: {}", set(secrets.github_token()));
            println!();
            println!("Metrics:");
            println!("  base_url: {}", config.metrics.base_url);
            println!();
            println!("Agent Settings:");
            println!(
                "  project_endpoint: {}",
                config.agent.project_endpoint.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  model_deployment: {}",
                config.agent.model_deployment.as_deref().unwrap_or("(not set)")
            );
            println!("  api_version: {}", config.agent.api_version);
            println!("  poll_interval: {:?}", config.agent.poll_interval);
            println!("  token: {}", set(secrets.agent_token()));
            println!();
            if let Some(path) = cli.config.clone().or_else(Config::default_config_path) {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        Some(Commands::InitSecrets) => {
            let path = Secrets::create_template()?;
            println!("Created {}", path.display());
            println!("Edit it to add your GitHub and agent service tokens.");
        }
        None => {
            println!("DevEx - developer experience scorecards for GitHub repositories");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
