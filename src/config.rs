//! Configuration
//!
//! Jira connection settings plus sync options, loadable from a YAML file
//! and overridable from the CLI. The API token itself never lives in the
//! file; the config names the environment variable that carries it.

use crate::converter::DanglingEpicPolicy;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Jira connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Jira instance URL
    pub url: String,

    /// Account email for basic auth
    pub email: String,

    /// Environment variable holding the API token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

impl JiraConfig {
    /// Create a new Jira configuration
    pub fn new(url: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            email: email.into(),
            token_env: None,
        }
    }

    /// Name the environment variable holding the API token
    pub fn with_token_env(mut self, env_var: impl Into<String>) -> Self {
        self.token_env = Some(env_var.into());
        self
    }
}

/// Full sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Jira connection settings
    pub jira: JiraConfig,

    /// Beads store root (the directory containing issues/ and epics/)
    #[serde(default = "default_store")]
    pub store: PathBuf,

    /// Maximum concurrent issue fetches during resolution
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// What to do with an epic reference that was never fetched
    #[serde(default)]
    pub dangling_epics: DanglingEpicPolicy,
}

fn default_store() -> PathBuf {
    PathBuf::from(".beads")
}

fn default_concurrency() -> usize {
    4
}

impl SyncConfig {
    /// Create a configuration with default sync options
    pub fn new(jira: JiraConfig) -> Self {
        Self {
            jira,
            store: default_store(),
            concurrency: default_concurrency(),
            dangling_epics: DanglingEpicPolicy::default(),
        }
    }

    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}
