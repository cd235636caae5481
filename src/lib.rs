//! jira-beads-sync - One-way migration of Jira issue graphs into beads
//!
//! Resolves the full connected graph of Jira items reachable from one root
//! issue (parent/subtask hierarchy plus typed issue links), translates each
//! item into the beads schema, and renders the result as one YAML file per
//! issue and per epic in a beads store directory. Re-running against
//! unchanged Jira state converges to byte-identical files.
//!
//! # Architecture
//!
//! - **jira**: typed Jira REST payloads and the `IssueSource` fetch capability
//! - **resolver**: transitive graph resolution with bounded parallel fetches
//! - **converter**: Jira schema → beads schema translation
//! - **beads**: target data model and the YAML store renderer
//! - **pipeline**: resolver → converter → renderer orchestration
//! - **config**: Jira credentials and sync options

pub mod beads;
pub mod config;
pub mod converter;
pub mod error;
pub mod jira;
pub mod logging;
pub mod pipeline;
pub mod resolver;

// Re-exports
pub use error::{Result, SyncError};
