//! openlane-summary - quick look at OpenLANE runs
//!
//! Finds the run directory of a design, condenses its summary, DRC and
//! antenna reports, and opens intermediate layouts in external viewers.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

pub mod artifact;
pub mod cli;
pub mod config;
pub mod copy;
pub mod report;
pub mod run;
pub mod viewer;

#[cfg(test)]
pub mod testutil;

// Re-export commonly used types
pub use config::{Env, Settings, ViewerConfig};
pub use copy::{copy_final, CopyReport};
pub use report::{AntennaReport, DrcReport, SummaryRecord, Verdict};
pub use run::{resolve_run, Layout, ResolvedRun, Run, RunLookupError, RunQuery, RunSelection};
pub use viewer::{Artifact, Dispatcher, Viewer};
