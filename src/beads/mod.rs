//! Beads target data model
//!
//! Matches the beads YAML schema consumed by the `bd` CLI: issues and epics
//! are separate entities, hierarchy is a flat `epic` back-reference, and
//! blocking relations collapse into a `dependsOn` list.

mod renderer;

pub use renderer::{WriteFailure, YamlRenderer};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Issue status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    InProgress,
    Blocked,
    Closed,
}

impl Default for Status {
    fn default() -> Self {
        Self::Open
    }
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Closed => "closed",
        }
    }
}

/// Issue priority (p0 = critical, p4 = backlog)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
    P4,
}

impl Default for Priority {
    fn default() -> Self {
        Self::P2
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P0 => "p0",
            Self::P1 => "p1",
            Self::P2 => "p2",
            Self::P3 => "p3",
            Self::P4 => "p4",
        }
    }
}

/// Provenance block carried by every issue and epic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Source issue key (e.g. "PROJ-101")
    #[serde(rename = "jiraKey", default, skip_serializing_if = "String::is_empty")]
    pub jira_key: String,

    /// Source numeric id
    #[serde(rename = "jiraID", default, skip_serializing_if = "String::is_empty")]
    pub jira_id: String,

    /// Source issue type name
    #[serde(
        rename = "jiraIssueType",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub jira_issue_type: String,

    /// Free-form extra key/value pairs
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, String>,
}

/// One beads issue file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Identifier: lowercased source key
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    pub status: Status,

    pub priority: Priority,

    /// Back-reference to the owning epic's identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    /// Identifiers of issues this one depends on
    #[serde(rename = "dependsOn", default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    #[serde(default)]
    pub metadata: Metadata,
}

/// One beads epic file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Epic {
    /// Identifier: lowercased source key
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    #[serde(default)]
    pub metadata: Metadata,
}

/// A full export: every issue and epic destined for the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Export {
    #[serde(default)]
    pub issues: Vec<Issue>,

    #[serde(default)]
    pub epics: Vec<Epic>,
}

impl Export {
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty() && self.epics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len() + self.epics.len()
    }
}
