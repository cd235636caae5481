//! Jira → beads schema translation
//!
//! Classifies every resolved item as an epic or an issue, translates
//! statuses, priorities, hierarchy, and blocking links, and produces a
//! deterministic, id-sorted export. Conversion is fail-soft: items with
//! schema errors are excluded and reported, siblings still convert.

use crate::beads::{Epic, Export, Issue, Metadata, Priority, Status};
use crate::jira::{JiraIssue, LinkDirection};
use crate::resolver::SourceGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use tracing::{debug, warn};

/// What to do with an `epic` back-reference whose epic never made it into
/// the resolved graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DanglingEpicPolicy {
    /// Retain the unresolved identifier silently
    Keep,
    /// Retain the identifier and record a warning
    Warn,
    /// Omit the epic field silently
    Drop,
}

impl Default for DanglingEpicPolicy {
    fn default() -> Self {
        Self::Warn
    }
}

impl FromStr for DanglingEpicPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "warn" => Ok(Self::Warn),
            "drop" => Ok(Self::Drop),
            other => Err(format!(
                "invalid dangling-epic policy {:?} (expected keep, warn, or drop)",
                other
            )),
        }
    }
}

/// A per-item schema error; the item is excluded from the export
#[derive(Debug, Clone)]
pub struct ConversionError {
    pub key: String,
    pub reason: String,
}

/// Conversion output: the export plus everything non-fatal that went wrong
#[derive(Debug, Default)]
pub struct Conversion {
    pub export: Export,
    pub errors: Vec<ConversionError>,
    pub warnings: Vec<String>,
}

/// Translates a resolved source graph into a beads export
#[derive(Debug, Default)]
pub struct SchemaConverter {
    dangling_epics: DanglingEpicPolicy,
}

impl SchemaConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dangling epic reference policy
    pub fn with_dangling_epics(mut self, policy: DanglingEpicPolicy) -> Self {
        self.dangling_epics = policy;
        self
    }

    /// Convert every item in the graph
    ///
    /// Output lists are sorted by identifier, so conversion is deterministic
    /// regardless of fetch order.
    pub fn convert(&self, graph: &SourceGraph) -> Conversion {
        let mut conversion = Conversion::default();

        let epic_ids: BTreeSet<String> = graph
            .iter()
            .filter(|(_, item)| item.is_epic())
            .map(|(key, _)| target_id(key))
            .collect();

        let dependencies = collect_dependencies(graph);

        for (key, item) in graph.iter() {
            let id = target_id(key);

            let title = match item.fields.summary.as_deref() {
                Some(summary) if !summary.is_empty() => summary.to_string(),
                _ => {
                    warn!(key = %key, "Skipping item without a summary");
                    conversion.errors.push(ConversionError {
                        key: key.clone(),
                        reason: "missing summary".to_string(),
                    });
                    continue;
                }
            };

            let status = match convert_status(item) {
                Ok(status) => status,
                Err(reason) => {
                    conversion.errors.push(ConversionError {
                        key: key.clone(),
                        reason,
                    });
                    continue;
                }
            };

            if item.fields.created.is_some() && item.created_at().is_none() {
                conversion
                    .warnings
                    .push(format!("{}: unparseable created timestamp", key));
            }
            if item.fields.updated.is_some() && item.updated_at().is_none() {
                conversion
                    .warnings
                    .push(format!("{}: unparseable updated timestamp", key));
            }

            let metadata = Metadata {
                jira_key: item.key.clone(),
                jira_id: item.id.clone(),
                jira_issue_type: item.fields.issue_type.name.clone(),
                custom: BTreeMap::new(),
            };

            if item.is_epic() {
                conversion.export.epics.push(Epic {
                    id,
                    name: title,
                    description: item.fields.description.clone().unwrap_or_default(),
                    status,
                    created: item.created_at(),
                    updated: item.updated_at(),
                    metadata,
                });
                continue;
            }

            let priority = match convert_priority(item) {
                Ok(priority) => priority,
                Err(reason) => {
                    conversion.errors.push(ConversionError {
                        key: key.clone(),
                        reason,
                    });
                    continue;
                }
            };

            let epic = self.epic_reference(item, &epic_ids, &mut conversion.warnings);

            let depends_on: Vec<String> = dependencies
                .get(&id)
                .map(|deps| deps.iter().cloned().collect())
                .unwrap_or_default();

            conversion.export.issues.push(Issue {
                id,
                title,
                description: item.fields.description.clone().unwrap_or_default(),
                status,
                priority,
                epic,
                assignee: convert_assignee(item),
                labels: item.fields.labels.clone(),
                depends_on,
                created: item.created_at(),
                updated: item.updated_at(),
                metadata,
            });
        }

        conversion.export.issues.sort_by(|a, b| a.id.cmp(&b.id));
        conversion.export.epics.sort_by(|a, b| a.id.cmp(&b.id));

        debug!(
            issues = conversion.export.issues.len(),
            epics = conversion.export.epics.len(),
            errors = conversion.errors.len(),
            "Converted source graph"
        );

        conversion
    }

    /// The epic back-reference, applying the dangling policy when the parent
    /// epic never made it into the graph
    fn epic_reference(
        &self,
        item: &JiraIssue,
        epic_ids: &BTreeSet<String>,
        warnings: &mut Vec<String>,
    ) -> Option<String> {
        let parent = item.fields.parent.as_ref()?;
        if !parent.fields.issue_type.name.eq_ignore_ascii_case("epic") {
            return None;
        }

        let epic_id = target_id(&parent.key);
        if epic_ids.contains(&epic_id) {
            return Some(epic_id);
        }

        match self.dangling_epics {
            DanglingEpicPolicy::Keep => Some(epic_id),
            DanglingEpicPolicy::Warn => {
                warnings.push(format!(
                    "{}: epic {} referenced but not resolved",
                    item.key, parent.key
                ));
                Some(epic_id)
            }
            DanglingEpicPolicy::Drop => None,
        }
    }
}

/// Target identifier: lowercase of the source key
fn target_id(key: &str) -> String {
    key.to_lowercase()
}

/// Map the Jira status category onto the beads status enumeration
fn convert_status(item: &JiraIssue) -> std::result::Result<Status, String> {
    let category = item
        .fields
        .status
        .status_category
        .as_ref()
        .ok_or_else(|| "missing status category".to_string())?;

    match category.key.as_str() {
        "new" => Ok(Status::Open),
        "indeterminate" => Ok(Status::InProgress),
        "done" => Ok(Status::Closed),
        other => Err(format!("unrecognized status category {:?}", other)),
    }
}

/// Map the Jira priority name onto the five beads tiers
///
/// An absent priority defaults to p2; an unrecognized name is an error.
fn convert_priority(item: &JiraIssue) -> std::result::Result<Priority, String> {
    let Some(priority) = item.fields.priority.as_ref() else {
        return Ok(Priority::P2);
    };

    match priority.name.as_str() {
        "Highest" => Ok(Priority::P0),
        "High" => Ok(Priority::P1),
        "Medium" => Ok(Priority::P2),
        "Low" => Ok(Priority::P3),
        "Lowest" => Ok(Priority::P4),
        other => Err(format!("unrecognized priority {:?}", other)),
    }
}

/// Assignee: email address if present, else display name, else omitted
fn convert_assignee(item: &JiraIssue) -> Option<String> {
    let assignee = item.fields.assignee.as_ref()?;
    if let Some(email) = assignee.email.as_deref() {
        if !email.is_empty() {
            return Some(email.to_string());
        }
    }
    if !assignee.display_name.is_empty() {
        return Some(assignee.display_name.clone());
    }
    None
}

/// Derive every dependency edge from Blocks-typed links.
///
/// Seen on item X, an outward link names an issue X blocks (the linked issue
/// depends on X); an inward link names an issue blocking X (X depends on the
/// linked issue). Both mirrored halves of one Jira link agree under this
/// reading, and the set collapses the duplicates.
fn collect_dependencies(graph: &SourceGraph) -> BTreeMap<String, BTreeSet<String>> {
    let mut dependencies: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for (key, item) in graph.iter() {
        let id = target_id(key);
        for link in &item.fields.issue_links {
            if !link.is_blocking() {
                continue;
            }
            let Some((direction, linked_key)) = link.target() else {
                continue;
            };
            let linked_id = target_id(linked_key);
            let (blocked, blocker) = match direction {
                LinkDirection::Outward => (linked_id, id.clone()),
                LinkDirection::Inward => (id.clone(), linked_id),
            };
            if blocked != blocker {
                dependencies.entry(blocked).or_default().insert(blocker);
            }
        }
    }

    dependencies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jira::{
        JiraFields, JiraIssueLink, JiraIssueType, JiraLinkType, JiraLinkedIssue, JiraParent,
        JiraParentFields, JiraPriority, JiraStatus, JiraStatusCategory, JiraUser,
    };

    fn item(key: &str, type_name: &str, category: &str) -> JiraIssue {
        JiraIssue {
            key: key.to_string(),
            id: "10000".to_string(),
            fields: JiraFields {
                summary: Some(format!("Summary of {}", key)),
                issue_type: JiraIssueType {
                    name: type_name.to_string(),
                    subtask: false,
                },
                status: JiraStatus {
                    name: String::new(),
                    status_category: Some(JiraStatusCategory {
                        key: category.to_string(),
                        name: String::new(),
                    }),
                },
                priority: Some(JiraPriority {
                    name: "Medium".to_string(),
                }),
                ..Default::default()
            },
        }
    }

    fn graph_of(items: Vec<JiraIssue>) -> SourceGraph {
        let mut graph = SourceGraph::new();
        for item in items {
            graph.insert(item);
        }
        graph
    }

    #[test]
    fn test_status_mapping_is_exact() {
        for (category, expected) in [
            ("new", Status::Open),
            ("indeterminate", Status::InProgress),
            ("done", Status::Closed),
        ] {
            let graph = graph_of(vec![item("PROJ-1", "Task", category)]);
            let conversion = SchemaConverter::new().convert(&graph);
            assert_eq!(conversion.export.issues[0].status, expected);
            assert!(conversion.errors.is_empty());
        }
    }

    #[test]
    fn test_unknown_status_category_is_schema_error() {
        let graph = graph_of(vec![
            item("PROJ-1", "Task", "unmapped"),
            item("PROJ-2", "Task", "new"),
        ]);
        let conversion = SchemaConverter::new().convert(&graph);

        // The bad item is excluded, the sibling still converts
        assert_eq!(conversion.export.issues.len(), 1);
        assert_eq!(conversion.export.issues[0].id, "proj-2");
        assert_eq!(conversion.errors.len(), 1);
        assert_eq!(conversion.errors[0].key, "PROJ-1");
        assert!(conversion.errors[0].reason.contains("unmapped"));
    }

    #[test]
    fn test_missing_status_category_is_schema_error() {
        let mut bad = item("PROJ-1", "Task", "new");
        bad.fields.status.status_category = None;
        let conversion = SchemaConverter::new().convert(&graph_of(vec![bad]));
        assert!(conversion.export.issues.is_empty());
        assert_eq!(conversion.errors.len(), 1);
    }

    #[test]
    fn test_priority_mapping_is_exact() {
        for (name, expected) in [
            ("Highest", Priority::P0),
            ("High", Priority::P1),
            ("Medium", Priority::P2),
            ("Low", Priority::P3),
            ("Lowest", Priority::P4),
        ] {
            let mut source = item("PROJ-1", "Task", "new");
            source.fields.priority = Some(JiraPriority {
                name: name.to_string(),
            });
            let conversion = SchemaConverter::new().convert(&graph_of(vec![source]));
            assert_eq!(conversion.export.issues[0].priority, expected);
        }
    }

    #[test]
    fn test_unknown_priority_is_schema_error() {
        let mut source = item("PROJ-1", "Task", "new");
        source.fields.priority = Some(JiraPriority {
            name: "Urgent".to_string(),
        });
        let conversion = SchemaConverter::new().convert(&graph_of(vec![source]));
        assert!(conversion.export.issues.is_empty());
        assert!(conversion.errors[0].reason.contains("Urgent"));
    }

    #[test]
    fn test_missing_priority_defaults_to_p2() {
        let mut source = item("PROJ-1", "Task", "new");
        source.fields.priority = None;
        let conversion = SchemaConverter::new().convert(&graph_of(vec![source]));
        assert_eq!(conversion.export.issues[0].priority, Priority::P2);
        assert!(conversion.errors.is_empty());
    }

    #[test]
    fn test_epic_classification_by_type_name() {
        let graph = graph_of(vec![
            item("PROJ-1", "Epic", "new"),
            item("PROJ-2", "Story", "new"),
            item("PROJ-3", "Subtask", "new"),
            item("PROJ-4", "epic", "new"),
        ]);
        let conversion = SchemaConverter::new().convert(&graph);

        let epic_ids: Vec<_> = conversion.export.epics.iter().map(|e| &e.id).collect();
        let issue_ids: Vec<_> = conversion.export.issues.iter().map(|i| &i.id).collect();
        assert_eq!(epic_ids, ["proj-1", "proj-4"]);
        assert_eq!(issue_ids, ["proj-2", "proj-3"]);
    }

    #[test]
    fn test_missing_summary_skips_item() {
        let mut bad = item("PROJ-1", "Task", "new");
        bad.fields.summary = None;
        let graph = graph_of(vec![bad, item("PROJ-2", "Task", "new")]);
        let conversion = SchemaConverter::new().convert(&graph);

        assert_eq!(conversion.export.issues.len(), 1);
        assert_eq!(conversion.errors[0].reason, "missing summary");
    }

    #[test]
    fn test_epic_backreference_only_for_epic_parents() {
        let mut story = item("PROJ-101", "Story", "new");
        story.fields.parent = Some(JiraParent {
            key: "PROJ-100".to_string(),
            fields: JiraParentFields {
                issue_type: JiraIssueType {
                    name: "Epic".to_string(),
                    subtask: false,
                },
            },
        });
        let mut subtask = item("PROJ-102", "Subtask", "new");
        subtask.fields.parent = Some(JiraParent {
            key: "PROJ-101".to_string(),
            fields: JiraParentFields {
                issue_type: JiraIssueType {
                    name: "Story".to_string(),
                    subtask: false,
                },
            },
        });

        let graph = graph_of(vec![item("PROJ-100", "Epic", "new"), story, subtask]);
        let conversion = SchemaConverter::new().convert(&graph);

        let by_id: BTreeMap<_, _> = conversion
            .export
            .issues
            .iter()
            .map(|i| (i.id.clone(), i))
            .collect();
        assert_eq!(by_id["proj-101"].epic.as_deref(), Some("proj-100"));
        assert_eq!(by_id["proj-102"].epic, None);
    }

    #[test]
    fn test_dangling_epic_policies() {
        let make_graph = || {
            let mut story = item("PROJ-2", "Story", "new");
            story.fields.parent = Some(JiraParent {
                key: "PROJ-999".to_string(),
                fields: JiraParentFields {
                    issue_type: JiraIssueType {
                        name: "Epic".to_string(),
                        subtask: false,
                    },
                },
            });
            graph_of(vec![story])
        };

        let kept = SchemaConverter::new()
            .with_dangling_epics(DanglingEpicPolicy::Keep)
            .convert(&make_graph());
        assert_eq!(kept.export.issues[0].epic.as_deref(), Some("proj-999"));
        assert!(kept.warnings.is_empty());

        let warned = SchemaConverter::new()
            .with_dangling_epics(DanglingEpicPolicy::Warn)
            .convert(&make_graph());
        assert_eq!(warned.export.issues[0].epic.as_deref(), Some("proj-999"));
        assert_eq!(warned.warnings.len(), 1);

        let dropped = SchemaConverter::new()
            .with_dangling_epics(DanglingEpicPolicy::Drop)
            .convert(&make_graph());
        assert_eq!(dropped.export.issues[0].epic, None);
        assert!(dropped.warnings.is_empty());
    }

    #[test]
    fn test_blocking_links_become_dependencies() {
        let mut blocker = item("PROJ-101", "Story", "new");
        blocker.fields.issue_links.push(JiraIssueLink {
            link_type: JiraLinkType {
                name: "Blocks".to_string(),
            },
            inward_issue: None,
            outward_issue: Some(JiraLinkedIssue {
                key: "PROJ-103".to_string(),
            }),
        });
        let mut blocked = item("PROJ-103", "Task", "new");
        blocked.fields.issue_links.push(JiraIssueLink {
            link_type: JiraLinkType {
                name: "Blocks".to_string(),
            },
            inward_issue: Some(JiraLinkedIssue {
                key: "PROJ-101".to_string(),
            }),
            outward_issue: None,
        });

        let graph = graph_of(vec![blocker, blocked]);
        let conversion = SchemaConverter::new().convert(&graph);

        let by_id: BTreeMap<_, _> = conversion
            .export
            .issues
            .iter()
            .map(|i| (i.id.clone(), i))
            .collect();
        // Both mirrored halves collapse into a single edge
        assert_eq!(by_id["proj-103"].depends_on, vec!["proj-101".to_string()]);
        assert!(by_id["proj-101"].depends_on.is_empty());
    }

    #[test]
    fn test_non_blocking_links_are_ignored() {
        let mut source = item("PROJ-1", "Task", "new");
        source.fields.issue_links.push(JiraIssueLink {
            link_type: JiraLinkType {
                name: "Relates".to_string(),
            },
            inward_issue: None,
            outward_issue: Some(JiraLinkedIssue {
                key: "PROJ-2".to_string(),
            }),
        });
        let graph = graph_of(vec![source, item("PROJ-2", "Task", "new")]);
        let conversion = SchemaConverter::new().convert(&graph);

        for issue in &conversion.export.issues {
            assert!(issue.depends_on.is_empty());
        }
    }

    #[test]
    fn test_assignee_prefers_email() {
        let mut with_email = item("PROJ-1", "Task", "new");
        with_email.fields.assignee = Some(JiraUser {
            display_name: "John Doe".to_string(),
            account_id: None,
            email: Some("john@example.com".to_string()),
        });
        let mut name_only = item("PROJ-2", "Task", "new");
        name_only.fields.assignee = Some(JiraUser {
            display_name: "Jane Doe".to_string(),
            account_id: None,
            email: None,
        });

        let graph = graph_of(vec![with_email, name_only]);
        let conversion = SchemaConverter::new().convert(&graph);

        let by_id: BTreeMap<_, _> = conversion
            .export
            .issues
            .iter()
            .map(|i| (i.id.clone(), i))
            .collect();
        assert_eq!(by_id["proj-1"].assignee.as_deref(), Some("john@example.com"));
        assert_eq!(by_id["proj-2"].assignee.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_output_sorted_by_id() {
        let graph = graph_of(vec![
            item("PROJ-9", "Task", "new"),
            item("PROJ-10", "Task", "new"),
            item("PROJ-1", "Task", "new"),
        ]);
        let conversion = SchemaConverter::new().convert(&graph);

        let ids: Vec<_> = conversion.export.issues.iter().map(|i| &i.id).collect();
        assert_eq!(ids, ["proj-1", "proj-10", "proj-9"]);
    }

    #[test]
    fn test_metadata_carries_provenance() {
        let graph = graph_of(vec![item("PROJ-1", "Story", "new")]);
        let conversion = SchemaConverter::new().convert(&graph);

        let metadata = &conversion.export.issues[0].metadata;
        assert_eq!(metadata.jira_key, "PROJ-1");
        assert_eq!(metadata.jira_id, "10000");
        assert_eq!(metadata.jira_issue_type, "Story");
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "warn".parse::<DanglingEpicPolicy>().unwrap(),
            DanglingEpicPolicy::Warn
        );
        assert_eq!(
            "Drop".parse::<DanglingEpicPolicy>().unwrap(),
            DanglingEpicPolicy::Drop
        );
        assert!("everything".parse::<DanglingEpicPolicy>().is_err());
    }
}
