//! Typed Jira REST payloads
//!
//! Explicit structures for the `GET /rest/api/2/issue/{key}` response.
//! Every optional field is an `Option` so absence is visible in the type,
//! not discovered through missing-key lookups at use sites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One Jira issue as fetched from the REST API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    pub id: String,
    #[serde(default)]
    pub fields: JiraFields,
}

/// Jira issue fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "issuetype", default)]
    pub issue_type: JiraIssueType,
    #[serde(default)]
    pub status: JiraStatus,
    #[serde(default)]
    pub priority: Option<JiraPriority>,
    #[serde(default)]
    pub assignee: Option<JiraUser>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub parent: Option<JiraParent>,
    #[serde(default)]
    pub subtasks: Vec<JiraSubtask>,
    #[serde(rename = "issuelinks", default)]
    pub issue_links: Vec<JiraIssueLink>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraIssueType {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subtask: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraStatus {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "statusCategory", default)]
    pub status_category: Option<JiraStatusCategory>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraStatusCategory {
    pub key: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraPriority {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraUser {
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(rename = "accountId", default)]
    pub account_id: Option<String>,
    #[serde(rename = "emailAddress", default)]
    pub email: Option<String>,
}

/// Parent reference, carrying the parent's issue type so the converter can
/// tell an epic parent from an ordinary one without another fetch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraParent {
    pub key: String,
    #[serde(default)]
    pub fields: JiraParentFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraParentFields {
    #[serde(rename = "issuetype", default)]
    pub issue_type: JiraIssueType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraSubtask {
    pub key: String,
}

/// A typed, directional link between two issues
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraIssueLink {
    #[serde(rename = "type", default)]
    pub link_type: JiraLinkType,
    #[serde(rename = "inwardIssue", default)]
    pub inward_issue: Option<JiraLinkedIssue>,
    #[serde(rename = "outwardIssue", default)]
    pub outward_issue: Option<JiraLinkedIssue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraLinkType {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraLinkedIssue {
    pub key: String,
}

/// Which side of a link the linked issue sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDirection {
    Inward,
    Outward,
}

impl JiraIssueLink {
    /// The linked issue's key together with its direction, if the link
    /// carries either endpoint
    pub fn target(&self) -> Option<(LinkDirection, &str)> {
        if let Some(ref inward) = self.inward_issue {
            return Some((LinkDirection::Inward, &inward.key));
        }
        if let Some(ref outward) = self.outward_issue {
            return Some((LinkDirection::Outward, &outward.key));
        }
        None
    }

    /// Whether this link encodes a blocking relation
    pub fn is_blocking(&self) -> bool {
        self.link_type.name.eq_ignore_ascii_case("blocks")
    }
}

impl JiraIssue {
    /// Whether this issue's type classifies it as an epic
    pub fn is_epic(&self) -> bool {
        self.fields.issue_type.name.eq_ignore_ascii_case("epic")
    }

    /// Every issue key this item references: parent, subtasks, and both
    /// directions of every link
    pub fn related_keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        if let Some(ref parent) = self.fields.parent {
            keys.push(parent.key.as_str());
        }
        for subtask in &self.fields.subtasks {
            keys.push(subtask.key.as_str());
        }
        for link in &self.fields.issue_links {
            if let Some((_, key)) = link.target() {
                keys.push(key);
            }
        }
        keys
    }

    /// Creation timestamp, if present and parseable
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.fields.created.as_deref().and_then(parse_timestamp)
    }

    /// Last-update timestamp, if present and parseable
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.fields.updated.as_deref().and_then(parse_timestamp)
    }
}

/// Jira's REST timestamp format ("2024-01-01T10:00:00.000+0000")
const JIRA_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Parse a Jira timestamp, tolerating plain RFC3339 as well
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, JIRA_TIME_FORMAT)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
