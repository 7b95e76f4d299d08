//! Configuration management for the scorecard demo
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (`PROJECT_ENDPOINT`, `MODEL_DEPLOYMENT_NAME`, `DEVEX_*`)
//! 3. Config file (~/.config/devex/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default base URL of the GitHub REST API
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";

/// Default metrics service endpoint
pub const DEFAULT_METRICS_URL: &str = "https://api.githubcopilot.com/mcp/repos";

/// GitHub REST API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Base URL for the contents endpoint
    pub api_base: String,

    /// Request timeout, client default when unset
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_GITHUB_API_BASE.to_string(),
            timeout: None,
        }
    }
}

/// Metrics service settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Full URL of the metrics endpoint, the `repo` query is appended
    pub base_url: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_METRICS_URL.to_string(),
        }
    }
}

/// Hosted agent service settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Project endpoint of the agent service
    pub project_endpoint: Option<String>,

    /// Model deployment the agent runs on
    pub model_deployment: Option<String>,

    /// `api-version` query value sent with every request
    pub api_version: String,

    /// Delay between run status polls
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            project_endpoint: None,
            model_deployment: None,
            api_version: "v1".to_string(),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// GitHub API configuration
    pub github: GitHubConfig,

    /// Metrics service configuration
    pub metrics: MetricsConfig,

    /// Agent service configuration
    pub agent: AgentConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        // Missing file means defaults
        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/devex/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("devex").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - PROJECT_ENDPOINT: Agent service project endpoint
    /// - MODEL_DEPLOYMENT_NAME: Model deployment for the agent
    /// - DEVEX_GITHUB_API_BASE: GitHub REST API base URL
    /// - DEVEX_METRICS_URL: Metrics endpoint
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = non_empty("PROJECT_ENDPOINT") {
            self.agent.project_endpoint = Some(endpoint);
        }

        if let Some(model) = non_empty("MODEL_DEPLOYMENT_NAME") {
            self.agent.model_deployment = Some(model);
        }

        if let Some(base) = non_empty("DEVEX_GITHUB_API_BASE") {
            self.github.api_base = base;
        }

        if let Some(url) = non_empty("DEVEX_METRICS_URL") {
            self.metrics.base_url = url;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        project_endpoint: Option<String>,
        model_deployment: Option<String>,
    ) -> Self {
        if let Some(endpoint) = project_endpoint {
            self.agent.project_endpoint = Some(endpoint);
        }

        if let Some(model) = model_deployment {
            self.agent.model_deployment = Some(model);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        config_path: Option<&Path>,
        project_endpoint: Option<String>,
        model_deployment: Option<String>,
    ) -> Result<Self> {
        let base = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        Ok(base
            .with_env_overrides()
            .with_cli_overrides(project_endpoint, model_deployment))
    }

    /// Project endpoint, required to talk to the agent service
    pub fn require_project_endpoint(&self) -> Result<&str> {
        self.agent.project_endpoint.as_deref().ok_or_else(|| {
            Error::Config(
                "PROJECT_ENDPOINT is not set. Add it to your .env file or pass --project-endpoint"
                    .to_string(),
            )
        })
    }

    /// Model deployment name, required to create an agent
    pub fn require_model_deployment(&self) -> Result<&str> {
        self.agent.model_deployment.as_deref().ok_or_else(|| {
            Error::Config(
                "MODEL_DEPLOYMENT_NAME is not set. Add it to your .env file or pass --model"
                    .to_string(),
            )
        })
    }
}
