//! Report parsers
//!
//! Each parser reads one text artifact of a run and renders it as plain
//! lines; coloring is left to the CLI display.

pub mod antenna;
pub mod drc;
pub mod summary;

pub use antenna::{AntennaReport, AntennaViolation, Verdict};
pub use drc::{DrcReport, DrcViolation};
pub use summary::SummaryRecord;
