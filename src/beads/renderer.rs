//! YAML store renderer
//!
//! Writes one file per issue and per epic under the store root:
//!
//! ```text
//! <store>/
//!   issues/
//!     <id>.yaml
//!   epics/
//!     <id>.yaml
//! ```
//!
//! Every write fully overwrites the destination file, so re-running against
//! unchanged input converges to byte-identical files and a resync reflects
//! only the current source state.

use super::{Epic, Export, Issue};
use crate::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A single file that could not be written
#[derive(Debug, Clone)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Renders an `Export` into a beads store directory
pub struct YamlRenderer {
    store_root: PathBuf,
}

impl YamlRenderer {
    /// Create a renderer rooted at the directory that holds issues/ and epics/
    pub fn new(store_root: impl Into<PathBuf>) -> Self {
        Self {
            store_root: store_root.into(),
        }
    }

    pub fn issues_dir(&self) -> PathBuf {
        self.store_root.join("issues")
    }

    pub fn epics_dir(&self) -> PathBuf {
        self.store_root.join("epics")
    }

    /// Write every issue and epic in the export
    ///
    /// Directory creation failure is fatal and aborts before any file is
    /// written. Individual write failures are collected and returned while
    /// the remaining files are still attempted.
    pub fn render_export(&self, export: &Export) -> Result<Vec<WriteFailure>> {
        let issues_dir = self.issues_dir();
        let epics_dir = self.epics_dir();
        fs::create_dir_all(&issues_dir)?;
        fs::create_dir_all(&epics_dir)?;

        let mut failures = Vec::new();

        for issue in &export.issues {
            let path = issues_dir.join(format!("{}.yaml", issue.id));
            if let Err(e) = write_yaml(&path, issue) {
                warn!(path = %path.display(), error = %e, "Failed to write issue file");
                failures.push(WriteFailure {
                    path,
                    reason: e.to_string(),
                });
            }
        }

        for epic in &export.epics {
            let path = epics_dir.join(format!("{}.yaml", epic.id));
            if let Err(e) = write_yaml(&path, epic) {
                warn!(path = %path.display(), error = %e, "Failed to write epic file");
                failures.push(WriteFailure {
                    path,
                    reason: e.to_string(),
                });
            }
        }

        info!(
            issues = export.issues.len(),
            epics = export.epics.len(),
            failed = failures.len(),
            "Rendered beads export"
        );

        Ok(failures)
    }

    /// Write a single issue file
    pub fn render_issue(&self, issue: &Issue) -> Result<()> {
        let dir = self.issues_dir();
        fs::create_dir_all(&dir)?;
        write_yaml(&dir.join(format!("{}.yaml", issue.id)), issue)
    }

    /// Write a single epic file
    pub fn render_epic(&self, epic: &Epic) -> Result<()> {
        let dir = self.epics_dir();
        fs::create_dir_all(&dir)?;
        write_yaml(&dir.join(format!("{}.yaml", epic.id)), epic)
    }
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(value)?;
    debug!(path = %path.display(), "Writing store file");
    fs::write(path, yaml)?;
    Ok(())
}
