//! Graph resolution
//!
//! Starting from one root issue key, fetches every item transitively
//! reachable through parent references, subtask lists, and both directions
//! of typed issue links. Hierarchy and link edges routinely form diamonds
//! and cycles ("A blocks B, B blocks A"), so traversal runs an explicit
//! frontier with a visited set: a key enters the visited set the moment it
//! is scheduled, which bounds every key to at most one fetch and guarantees
//! termination on cyclic graphs.

use crate::jira::{IssueSource, JiraIssue};
use crate::{Result, SyncError};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The resolved source-side graph: issue key → fetched item
///
/// Each key appears at most once; the contents are exactly the items
/// reachable from the root, root included.
#[derive(Debug, Clone, Default)]
pub struct SourceGraph {
    items: BTreeMap<String, JiraIssue>,
}

impl SourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, issue: JiraIssue) {
        self.items.insert(issue.key.clone(), issue);
    }

    pub fn get(&self, key: &str) -> Option<&JiraIssue> {
        self.items.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &JiraIssue)> {
        self.items.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.items.keys()
    }
}

/// A discovered key that could not be fetched
///
/// The edge that pointed at it stays in the graph as a dangling reference.
#[derive(Debug, Clone)]
pub struct UnresolvedRef {
    pub key: String,
    pub reason: String,
}

/// Outcome of a resolution run
#[derive(Debug, Default)]
pub struct Resolution {
    pub graph: SourceGraph,
    pub unresolved: Vec<UnresolvedRef>,
    /// True when cancellation stopped traversal before the frontier drained
    pub cancelled: bool,
}

/// Resolves the connected graph of issues around a root key
pub struct GraphResolver {
    source: Arc<dyn IssueSource>,
    concurrency: usize,
    cancel: CancellationToken,
}

impl GraphResolver {
    /// Create a resolver over a fetch capability
    pub fn new(source: Arc<dyn IssueSource>) -> Self {
        Self {
            source,
            concurrency: 4,
            cancel: CancellationToken::new(),
        }
    }

    /// Bound the number of concurrent fetches (minimum 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Attach an external cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Resolve the full graph reachable from `root_key`
    ///
    /// Failure to fetch the root is fatal. Failure to fetch a discovered key
    /// is recorded in `Resolution::unresolved` and traversal continues, so a
    /// stale or permission-restricted link cannot sink the whole run.
    pub async fn resolve(&self, root_key: &str) -> Result<Resolution> {
        let mut resolution = Resolution::default();

        if self.cancel.is_cancelled() {
            resolution.cancelled = true;
            return Ok(resolution);
        }

        let root = self
            .source
            .fetch_issue(root_key)
            .await
            .map_err(|e| SyncError::RootFetch {
                key: root_key.to_string(),
                reason: e.to_string(),
            })?;

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(root_key.to_string());

        let mut frontier = self.discover(&root, &mut visited);
        resolution.graph.insert(root);

        while !frontier.is_empty() {
            if self.cancel.is_cancelled() {
                debug!(pending = frontier.len(), "Resolution cancelled");
                resolution.cancelled = true;
                break;
            }

            let wave = std::mem::take(&mut frontier);
            let fetched = self.fetch_wave(wave).await;

            // Single aggregation point: wave results fold back into the
            // graph and the visited set here, never concurrently.
            for (key, result) in fetched {
                match result {
                    Ok(issue) => {
                        frontier.extend(self.discover(&issue, &mut visited));
                        resolution.graph.insert(issue);
                    }
                    Err(SyncError::Cancelled) => {
                        resolution.cancelled = true;
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "Failed to fetch linked issue");
                        resolution.unresolved.push(UnresolvedRef {
                            key,
                            reason: e.to_string(),
                        });
                    }
                }
            }

            if resolution.cancelled {
                break;
            }
        }

        info!(
            root = %root_key,
            resolved = resolution.graph.len(),
            unresolved = resolution.unresolved.len(),
            cancelled = resolution.cancelled,
            "Graph resolution finished"
        );

        Ok(resolution)
    }

    /// Fetch one frontier wave through a bounded pool, racing each fetch
    /// against cancellation
    async fn fetch_wave(&self, wave: Vec<String>) -> Vec<(String, Result<JiraIssue>)> {
        stream::iter(wave.into_iter().map(|key| {
            let source = Arc::clone(&self.source);
            let cancel = self.cancel.clone();
            async move {
                let result = tokio::select! {
                    _ = cancel.cancelled() => Err(SyncError::Cancelled),
                    result = source.fetch_issue(&key) => result,
                };
                (key, result)
            }
        }))
        .buffer_unordered(self.concurrency)
        .collect()
        .await
    }

    /// Collect referenced keys that have not been scheduled yet, marking
    /// them visited so no key is ever fetched twice
    fn discover(&self, issue: &JiraIssue, visited: &mut HashSet<String>) -> Vec<String> {
        issue
            .related_keys()
            .into_iter()
            .filter(|key| visited.insert((*key).to_string()))
            .map(str::to_string)
            .collect()
    }
}
