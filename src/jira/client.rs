//! Jira REST client
//!
//! Implements `IssueSource`, the fetch-by-key capability the resolver is
//! built against. Tests inject an in-memory source through the same trait
//! instead of a live client.

use super::JiraIssue;
use crate::config::JiraConfig;
use crate::{Result, SyncError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Per-request timeout for single issue fetches
const GET_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetch-by-key capability over the source tracker
///
/// The defined not-found outcome is `SyncError::IssueNotFound`.
#[async_trait]
pub trait IssueSource: Send + Sync {
    async fn fetch_issue(&self, key: &str) -> Result<JiraIssue>;
}

/// Jira API client
pub struct JiraClient {
    client: Client,
    base_url: String,
    email: String,
    token: Option<String>,
}

impl JiraClient {
    /// Create a new client from configuration
    ///
    /// The API token is resolved from the environment variable named in the
    /// config, if any. Returns an error if the HTTP client cannot be built.
    pub fn new(config: &JiraConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let base_url = format!("{}/rest/api/2", config.url.trim_end_matches('/'));

        let token = config
            .token_env
            .as_ref()
            .and_then(|env_var| std::env::var(env_var.trim_start_matches('$')).ok());

        Ok(Self {
            client,
            base_url,
            email: config.email.clone(),
            token,
        })
    }

    /// Override the API token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[async_trait]
impl IssueSource for JiraClient {
    /// Get a single issue by key
    async fn fetch_issue(&self, key: &str) -> Result<JiraIssue> {
        let url = format!("{}/issue/{}", self.base_url, key);

        debug!(key = %key, "Fetching Jira issue");

        let mut request = self.client.get(&url);
        if let Some(ref token) = self.token {
            request = request.basic_auth(&self.email, Some(token));
        }

        let response = request.timeout(GET_TIMEOUT).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(SyncError::IssueNotFound(key.to_string())),
            StatusCode::UNAUTHORIZED => {
                Err(SyncError::Auth("Jira authentication failed".to_string()))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);
                Err(SyncError::RateLimited(retry_after))
            }
            status => {
                let error_body = response.text().await.unwrap_or_default();
                Err(SyncError::Jira(format!(
                    "HTTP {}: {}",
                    status, error_body
                )))
            }
        }
    }
}
