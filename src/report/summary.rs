//! Summary CSV report
//!
//! OpenLANE writes one row of metrics per run. Only a handful of fields are
//! interesting for a quick look: anything mentioning violations or errors,
//! the die area and the flow status.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::artifact;

/// Where the summary lives, oldest OpenLANE layout first
pub const SUMMARY_PATTERNS: &[&str] = &["reports/final_summary_report.csv", "reports/metrics.csv"];

/// Width of the key column in printed summaries
const KEY_WIDTH: usize = 30;
/// Width of the value column in printed summaries
const VALUE_WIDTH: usize = 20;

/// Flat field → value mapping loaded from one row of the summary CSV
///
/// Field order follows the CSV header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryRecord {
    fields: Vec<(String, String)>,
}

impl SummaryRecord {
    /// Build a record from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse CSV content, keeping the first data row
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = reader
            .headers()
            .context("Failed to read summary header")?
            .clone();
        let row = reader
            .records()
            .next()
            .context("summary has a header but no data row")?
            .context("Failed to parse summary row")?;

        Ok(Self::from_pairs(headers.iter().zip(row.iter())))
    }

    /// Parse a summary CSV file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read summary file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Path of the summary file inside a run, if the run produced one
    pub fn locate(run_dir: &Path) -> Result<Option<PathBuf>> {
        artifact::locate(run_dir, SUMMARY_PATTERNS)
    }

    /// Load the summary of a run. A run without one most likely failed.
    pub fn load_from_run(run_dir: &Path) -> Result<Self> {
        match Self::locate(run_dir)? {
            Some(path) => Self::from_path(path),
            None => bail!(
                "summary file not found - did the run fail? ({})",
                run_dir.display()
            ),
        }
    }

    /// Look up a field by exact name
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All fields in header order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fields counting violations or errors
    pub fn violation_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields().filter(|(k, _)| is_violation_key(k))
    }

    /// Die area in mm², from the first area field that holds a number
    #[must_use]
    pub fn area_mm2(&self) -> Option<f64> {
        self.fields()
            .filter(|(k, _)| is_area_key(k))
            .find_map(|(k, v)| match v.parse::<f64>() {
                Ok(area) => Some(area),
                Err(_) => {
                    log::warn!("area field {k} is not a number: {v:?}");
                    None
                }
            })
    }

    /// Die area in µm²
    #[must_use]
    pub fn area_um2(&self) -> Option<f64> {
        self.area_mm2().map(|mm2| mm2 * 1e6)
    }

    /// Flow status, absent from reports of older OpenLANE versions
    #[must_use]
    pub fn flow_status(&self) -> Option<&str> {
        self.fields()
            .find(|(k, _)| k.contains("flow_status"))
            .map(|(_, v)| v)
    }

    /// Whether the flow ran to completion (`Flow_completed` / `flow completed`)
    #[must_use]
    pub fn is_flow_completed(&self) -> bool {
        self.flow_status()
            .is_some_and(|s| s.to_ascii_lowercase().contains("completed"))
    }

    /// Sum of every violation-like field holding a non-negative number.
    ///
    /// OpenLANE writes `-1` for checks that did not run; those are skipped.
    #[must_use]
    pub fn violation_total(&self) -> f64 {
        self.violation_fields()
            .filter_map(|(_, v)| v.parse::<f64>().ok())
            .filter(|n| n.is_finite() && *n >= 0.0)
            .sum()
    }
}

fn is_violation_key(key: &str) -> bool {
    key.contains("violation") || key.contains("error")
}

fn is_area_key(key: &str) -> bool {
    key.contains("AREA") || key.eq_ignore_ascii_case("area")
}

fn field_line(key: &str, value: &str) -> String {
    format!(
        "{key:>kw$} : {value:>vw$}",
        kw = KEY_WIDTH,
        vw = VALUE_WIDTH
    )
}

/// Condensed summary: violations, area and flow status
#[must_use]
pub fn summary_lines(record: &SummaryRecord) -> Vec<String> {
    let mut lines: Vec<String> = record
        .violation_fields()
        .map(|(k, v)| field_line(k, v))
        .collect();

    match record.area_um2() {
        Some(area) => lines.push(format!("area {area:.1} um^2")),
        None => log::warn!("summary has no area field"),
    }

    if let Some(status) = record.flow_status() {
        lines.push(format!("flow status: {status}"));
    }

    lines
}

/// Every field of the summary
#[must_use]
pub fn full_summary_lines(record: &SummaryRecord) -> Vec<String> {
    record.fields().map(|(k, v)| field_line(k, v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{make_run_dir, write_summary};
    use tempfile::TempDir;

    const LEGACY_CSV: &str = "\
design,design_name,config,flow_status,total_runtime,DIEAREA_mm^2,tritonRoute_violations,Short_violations,Magic_violations,antenna_violations,lvs_total_errors
/openlane/designs/spm,spm,RUN_2022.03.01,flow_completed,0h3m,0.0025,0,0,2,1,0
";

    #[test]
    fn test_parse_keeps_header_order() {
        let record = SummaryRecord::parse(LEGACY_CSV).unwrap();
        let keys: Vec<_> = record.fields().map(|(k, _)| k).collect();
        assert_eq!(keys[0], "design");
        assert_eq!(keys.len(), 11);
        assert_eq!(record.get("design_name"), Some("spm"));
    }

    #[test]
    fn test_parse_header_only_fails() {
        assert!(SummaryRecord::parse("design,flow_status\n").is_err());
    }

    #[test]
    fn test_violation_fields() {
        let record = SummaryRecord::parse(LEGACY_CSV).unwrap();
        let keys: Vec<_> = record.violation_fields().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "tritonRoute_violations",
                "Short_violations",
                "Magic_violations",
                "antenna_violations",
                "lvs_total_errors"
            ]
        );
        assert!((record.violation_total() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_violation_total_skips_not_run_checks() {
        let record = SummaryRecord::from_pairs([
            ("Magic_violations", "-1"),
            ("antenna_violations", "4"),
            ("lvs_total_errors", "n/a"),
        ]);
        assert!((record.violation_total() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_area_from_legacy_header() {
        let record = SummaryRecord::parse(LEGACY_CSV).unwrap();
        let area = record.area_um2().unwrap();
        assert!((area - 2500.0).abs() < 1e-6);
    }

    #[test]
    fn test_summary_lines_area_and_status() {
        let record = SummaryRecord::from_pairs([
            ("area", "0.0001"),
            ("flow_status", "Flow_completed"),
            ("drc_violations", "3"),
        ]);
        let lines = summary_lines(&record);
        assert!(lines.contains(&"area 100.0 um^2".to_string()));
        assert!(lines.contains(&"flow status: Flow_completed".to_string()));
        assert_eq!(
            lines[0],
            format!("{:>30} : {:>20}", "drc_violations", "3")
        );
    }

    #[test]
    fn test_summary_lines_without_status() {
        let record = SummaryRecord::from_pairs([("DIEAREA_mm^2", "0.5")]);
        let lines = summary_lines(&record);
        assert_eq!(lines, vec!["area 500000.0 um^2".to_string()]);
    }

    #[test]
    fn test_full_summary_lines_every_field() {
        let record = SummaryRecord::parse(LEGACY_CSV).unwrap();
        assert_eq!(full_summary_lines(&record).len(), 11);
    }

    #[test]
    fn test_flow_completed_variants() {
        for status in ["flow_completed", "Flow_completed", "flow completed"] {
            let record = SummaryRecord::from_pairs([("flow_status", status)]);
            assert!(record.is_flow_completed(), "{status}");
        }
        let failed = SummaryRecord::from_pairs([("flow_status", "flow failed")]);
        assert!(!failed.is_flow_completed());
        assert!(!SummaryRecord::default().is_flow_completed());
    }

    #[test]
    fn test_load_from_run_missing_summary() {
        let dir = TempDir::new().unwrap();
        let run = make_run_dir(dir.path(), "spm", "RUN_2022.03.01_10.00.00");
        let err = SummaryRecord::load_from_run(&run).unwrap_err();
        assert!(err.to_string().contains("did the run fail?"));
    }

    #[test]
    fn test_load_from_run_metrics_csv() {
        let dir = TempDir::new().unwrap();
        let run = make_run_dir(dir.path(), "spm", "RUN_2022.03.01_10.00.00");
        write_summary(
            &run,
            "reports/metrics.csv",
            &[("flow_status", "flow completed"), ("DIEAREA_mm^2", "0.01")],
        );
        let record = SummaryRecord::load_from_run(&run).unwrap();
        assert!(record.is_flow_completed());
    }
}
