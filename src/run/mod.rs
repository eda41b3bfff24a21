//! OpenLANE run directories
//!
//! A run is one directory under `<design>/runs/`, written by the flow and only
//! ever read here.

pub mod resolver;
pub mod timestamp;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::report::SummaryRecord;

pub use resolver::{resolve_run, Layout, ResolvedRun, RunLookupError, RunQuery, RunSelection, Selected};

/// One run directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Path of the run directory
    pub path: PathBuf,
    /// Directory name
    pub name: String,
    /// Start time parsed from the name, `None` when the name is not a timestamp
    pub timestamp: Option<NaiveDateTime>,
    /// Filesystem creation time, or modification time where creation time is unsupported
    pub created: SystemTime,
}

impl Run {
    /// Describe the run directory at `path`
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("Run path has no directory name: {}", path.display()))?;
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to stat run directory: {}", path.display()))?;
        let created = metadata
            .created()
            .or_else(|_| metadata.modified())
            .with_context(|| format!("No timestamps for run directory: {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            timestamp: timestamp::parse_run_name(&name),
            name,
            created,
        })
    }

    /// Load the summary report of this run
    pub fn summary(&self) -> Result<SummaryRecord> {
        SummaryRecord::load_from_run(&self.path)
    }
}

/// Sort runs by the timestamp in their names, unparseable names first
pub fn sort_runs(runs: &mut [Run]) {
    runs.sort_by(|a, b| timestamp::sort_key(&a.name).cmp(&timestamp::sort_key(&b.name)));
}
