//! Sync pipeline
//!
//! Wires resolver → converter → renderer into one linear run and folds
//! everything non-fatal into a `SyncReport`. Only a root fetch failure or a
//! store directory failure terminates the run without output.

use crate::beads::{WriteFailure, YamlRenderer};
use crate::converter::{ConversionError, DanglingEpicPolicy, SchemaConverter};
use crate::jira::IssueSource;
use crate::resolver::{GraphResolver, UnresolvedRef};
use crate::Result;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Pipeline tuning knobs
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Maximum concurrent issue fetches during resolution
    pub concurrency: usize,

    /// Policy for epic references that were never fetched
    pub dangling_epics: DanglingEpicPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            dangling_epics: DanglingEpicPolicy::default(),
        }
    }
}

/// Accumulated outcome of one sync run
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Items fetched into the source graph
    pub resolved: usize,

    /// Discovered keys that could not be fetched
    pub unresolved: Vec<UnresolvedRef>,

    /// Per-item schema errors (items excluded from the export)
    pub schema_errors: Vec<ConversionError>,

    /// Non-fatal conversion warnings
    pub warnings: Vec<String>,

    /// Issue files written
    pub issues_written: usize,

    /// Epic files written
    pub epics_written: usize,

    /// Individual file writes that failed
    pub write_failures: Vec<WriteFailure>,

    /// True when cancellation stopped the run early (nothing was written)
    pub cancelled: bool,
}

impl SyncReport {
    /// True when every stage completed with nothing to report
    pub fn is_clean(&self) -> bool {
        !self.cancelled
            && self.unresolved.is_empty()
            && self.schema_errors.is_empty()
            && self.write_failures.is_empty()
    }
}

/// The resolver → converter → renderer pipeline
pub struct Pipeline {
    source: Arc<dyn IssueSource>,
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline over a fetch capability
    pub fn new(source: Arc<dyn IssueSource>, options: PipelineOptions) -> Self {
        Self { source, options }
    }

    /// Resolve from `root_key`, convert, and render into `store_root`
    ///
    /// On cancellation the run stops issuing fetches, skips persistence
    /// entirely, and returns the report with `cancelled` set; the store is
    /// left untouched.
    pub async fn run(
        &self,
        root_key: &str,
        store_root: &Path,
        cancel: CancellationToken,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        let resolver = GraphResolver::new(Arc::clone(&self.source))
            .with_concurrency(self.options.concurrency)
            .with_cancellation(cancel);
        let resolution = resolver.resolve(root_key).await?;

        report.resolved = resolution.graph.len();
        report.unresolved = resolution.unresolved;

        if resolution.cancelled {
            report.cancelled = true;
            info!(root = %root_key, resolved = report.resolved, "Sync cancelled before rendering");
            return Ok(report);
        }

        let converter = SchemaConverter::new().with_dangling_epics(self.options.dangling_epics);
        let conversion = converter.convert(&resolution.graph);

        report.schema_errors = conversion.errors;
        report.warnings = conversion.warnings;
        report.issues_written = conversion.export.issues.len();
        report.epics_written = conversion.export.epics.len();

        let renderer = YamlRenderer::new(store_root);
        report.write_failures = renderer.render_export(&conversion.export)?;
        report.issues_written -= report
            .write_failures
            .iter()
            .filter(|f| f.path.starts_with(renderer.issues_dir()))
            .count();
        report.epics_written -= report
            .write_failures
            .iter()
            .filter(|f| f.path.starts_with(renderer.epics_dir()))
            .count();

        info!(
            root = %root_key,
            resolved = report.resolved,
            issues = report.issues_written,
            epics = report.epics_written,
            "Sync complete"
        );

        Ok(report)
    }
}
