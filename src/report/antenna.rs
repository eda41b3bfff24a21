//! Antenna report
//!
//! The antenna checker lists, per net and pin, the partial area ratio (PAR)
//! of each layer against the allowed ratio. Violating entries carry a `*`:
//!
//! ```text
//! _0123_
//!   _456_/A  (sky130_fd_sc_hd__inv_1)
//!     [1] met1:
//!       PAR:    5.00*  Ratio:   1.00      (Area)
//! ```
//!
//! A small overshoot is usually harmless, so each violation is classified by
//! how far PAR exceeds the allowed ratio.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::artifact;

/// PAR above this multiple of the allowed ratio is worth fixing
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Where the antenna report lives, oldest OpenLANE layout first
pub const ANTENNA_PATTERNS: &[&str] = &[
    "reports/routing/*antenna.rpt",
    "reports/signoff/*antenna.rpt",
    "logs/finishing/*antenna.log",
    "logs/signoff/*antenna.log",
];

fn par_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"PAR:\s*(\d+(?:\.\d+)?)\*\s+Ratio:\s*(\d+(?:\.\d+)?)")
            .expect("antenna pattern is a valid regex")
    })
}

/// What to do about one antenna violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// PAR is well above the allowed ratio
    WorthFixing,
    /// PAR is only marginally above the allowed ratio
    CanIgnore,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorthFixing => f.write_str("worth fixing"),
            Self::CanIgnore => f.write_str("can ignore"),
        }
    }
}

/// Classify a violation: worth fixing when `par > multiplier * ratio`
#[must_use]
pub fn classify(par: f64, ratio: f64, multiplier: f64) -> Verdict {
    if par > multiplier * ratio {
        Verdict::WorthFixing
    } else {
        Verdict::CanIgnore
    }
}

/// Extract `(par, ratio)` from a violating report line
#[must_use]
pub fn parse_line(line: &str) -> Option<(f64, f64)> {
    let caps = par_regex().captures(line)?;
    let par = caps[1].parse().ok()?;
    let ratio = caps[2].parse().ok()?;
    Some((par, ratio))
}

/// One violating layer of one net
#[derive(Debug, Clone, PartialEq)]
pub struct AntennaViolation {
    /// Net the violation was reported under, if the report names one
    pub net: Option<String>,
    /// Measured partial area ratio
    pub par: f64,
    /// Allowed ratio
    pub ratio: f64,
    /// Classification against the multiplier
    pub verdict: Verdict,
}

/// Parsed antenna report
#[derive(Debug, Clone, PartialEq)]
pub struct AntennaReport {
    /// Violations in report order
    pub violations: Vec<AntennaViolation>,
    /// Multiplier the verdicts were computed with
    pub multiplier: f64,
}

impl AntennaReport {
    /// Parse report content, classifying each violation with `multiplier`
    #[must_use]
    pub fn parse(content: &str, multiplier: f64) -> Self {
        let mut net: Option<String> = None;
        let mut violations = Vec::new();

        for line in content.lines() {
            if let Some((par, ratio)) = parse_line(line) {
                violations.push(AntennaViolation {
                    net: net.clone(),
                    par,
                    ratio,
                    verdict: classify(par, ratio, multiplier),
                });
            } else if !line.trim().is_empty() && !line.starts_with(char::is_whitespace) {
                net = Some(line.trim().to_string());
            }
        }

        Self {
            violations,
            multiplier,
        }
    }

    /// Read and parse a report file
    pub fn from_path<P: AsRef<Path>>(path: P, multiplier: f64) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read antenna report: {}", path.display()))?;
        Ok(Self::parse(&content, multiplier))
    }

    /// Number of violations classified as worth fixing
    #[must_use]
    pub fn worth_fixing(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.verdict == Verdict::WorthFixing)
            .count()
    }

    /// True when the report lists no violation
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// One line per violation, then a tally
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .violations
            .iter()
            .map(|v| {
                format!(
                    "* {:<30} PAR {:>8.2} ratio {:>8.2} : {}",
                    v.net.as_deref().unwrap_or("?"),
                    v.par,
                    v.ratio,
                    v.verdict
                )
            })
            .collect();
        lines.push(format!(
            "{} antenna violations, {} worth fixing (PAR > {}x ratio)",
            self.violations.len(),
            self.worth_fixing(),
            self.multiplier
        ));
        lines
    }
}

/// Locate the antenna report of a run. `None` means the run has none.
pub fn locate(run_dir: &Path) -> Result<Option<PathBuf>> {
    artifact::locate(run_dir, ANTENNA_PATTERNS)
}

/// Load the antenna report of a run, `None` when there is no report
pub fn load_from_run(run_dir: &Path, multiplier: f64) -> Result<Option<AntennaReport>> {
    locate(run_dir)?
        .map(|path| AntennaReport::from_path(path, multiplier))
        .transpose()
}
