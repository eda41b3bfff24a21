//! Magic DRC report
//!
//! The report lists each broken rule on a line ending in the rule name in
//! parentheses, followed by one line per offending box:
//!
//! ```text
//! spm
//! ----------------------------------------
//! Metal1 spacing < 0.14um (met1.2)
//! ----------------------------------------
//!  140.000um 45.000um 140.140um 45.500um
//! ----------------------------------------
//! [INFO]: COUNT: 1
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::artifact;

/// Where the DRC report lives, oldest OpenLANE layout first
pub const DRC_PATTERNS: &[&str] = &[
    "logs/magic/magic.drc",
    "reports/magic/*magic.drc",
    "reports/signoff/*drc.rpt",
];

/// One broken rule and the number of boxes breaking it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrcViolation {
    /// Rule description line, e.g. `Metal1 spacing < 0.14um (met1.2)`
    pub rule: String,
    /// Number of offending boxes listed under the rule
    pub count: usize,
}

/// Parsed DRC report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrcReport {
    /// Violations in report order
    pub violations: Vec<DrcViolation>,
}

impl DrcReport {
    /// Group report lines by rule
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut violations: Vec<DrcViolation> = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.contains('(') {
                violations.push(DrcViolation {
                    rule: line.to_string(),
                    count: 0,
                });
            } else if is_box_line(line) {
                // lines before the first rule are the cell name header
                if let Some(current) = violations.last_mut() {
                    current.count += 1;
                }
            }
        }

        Self { violations }
    }

    /// Read and parse a report file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read DRC report: {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    /// Total offending boxes across all rules
    #[must_use]
    pub fn total(&self) -> usize {
        self.violations.iter().map(|v| v.count).sum()
    }

    /// True when no rule is broken
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// One `* rule (count)` line per violation
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.violations
            .iter()
            .map(|v| format!("* {} ({})", v.rule, v.count))
            .collect()
    }
}

fn is_box_line(line: &str) -> bool {
    !line.is_empty() && !line.starts_with("---") && !line.starts_with("[INFO]")
}

/// Locate the DRC report of a run. `None` means the run has none.
pub fn locate(run_dir: &Path) -> Result<Option<PathBuf>> {
    artifact::locate(run_dir, DRC_PATTERNS)
}

/// Load the DRC report of a run, `None` when there is no report
pub fn load_from_run(run_dir: &Path) -> Result<Option<DrcReport>> {
    locate(run_dir)?.map(DrcReport::from_path).transpose()
}
