//! Error types for jira-beads-sync
//!
//! One crate-wide error enum covering every fatal failure mode. Non-fatal
//! issues (unresolved references, per-item schema errors, individual write
//! failures) travel in component result structs instead, so partial output
//! is never lost to an early return.

use thiserror::Error;

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Fatal error type for sync operations
#[derive(Error, Debug)]
pub enum SyncError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Jira API errors (non-2xx responses other than the cases below)
    #[error("Jira API error: {0}")]
    Jira(String),

    /// Issue not found on the Jira side
    #[error("Issue not found: {0}")]
    IssueNotFound(String),

    /// Rate limited (with retry-after duration in seconds)
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Root issue could not be fetched; resolution cannot start
    #[error("Failed to fetch root issue {key}: {reason}")]
    RootFetch { key: String, reason: String },

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Operation cancelled before completion
    #[error("Operation cancelled")]
    Cancelled,

    /// Other errors
    #[error("{0}")]
    Other(String),

    /// Anyhow errors (for more context)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_fetch_names_the_key() {
        let err = SyncError::RootFetch {
            key: "PROJ-100".to_string(),
            reason: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("PROJ-100"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SyncError = io.into();
        assert!(matches!(err, SyncError::Io(_)));
    }
}
