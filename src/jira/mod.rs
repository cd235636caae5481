//! Jira source side
//!
//! Typed REST payloads plus the `IssueSource` fetch capability implemented
//! over the Jira REST API.

mod client;
mod types;

pub use client::{IssueSource, JiraClient};
pub use types::{
    parse_timestamp, JiraFields, JiraIssue, JiraIssueLink, JiraIssueType, JiraLinkType,
    JiraLinkedIssue, JiraParent, JiraParentFields, JiraPriority, JiraStatus, JiraStatusCategory,
    JiraSubtask, JiraUser, LinkDirection,
};
