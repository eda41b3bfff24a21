//! Terminal rendering of reports
//!
//! The report modules produce plain lines; this is where they get colored.
//! Reports go to stdout so they can be piped or diffed between runs.

use colored::Colorize;

use crate::copy::CopyReport;
use crate::report::{summary, AntennaReport, DrcReport, SummaryRecord};
use crate::run::{ResolvedRun, Selected};

/// Section header, e.g. `=== summary`
fn print_section(title: &str) {
    println!("\n{} {}", "===".bold().cyan(), title.bold().cyan());
}

/// Line announcing how the run was selected, as printed before its path
#[must_use]
pub fn selection_line(selected: &Selected) -> String {
    match selected {
        Selected::Latest => "using latest run:".to_string(),
        Selected::Index(i) => format!("using run {i}:"),
        Selected::Interactive(i) => format!("using chosen run {i}:"),
        Selected::Regression { violations } => {
            format!("using best regression run ({violations} violations):")
        }
    }
}

/// Print which run is being reported on
pub fn print_run_header(resolved: &ResolvedRun) {
    println!("{}", selection_line(&resolved.selected).dimmed());
    println!("{}", resolved.run.path.display().to_string().bold());
}

/// Markdown heading opening a `--report`, e.g. `## spm : DESIGN=spm RUN_DATE=RUN_2022.08.22_19.14.37`
#[must_use]
pub fn report_heading(design: &str, run_name: &str) -> String {
    format!("## {design} : DESIGN={design} RUN_DATE={run_name}\n")
}

/// Print the condensed summary, coloring the flow status
pub fn print_summary(record: &SummaryRecord) {
    print_section("summary");
    for line in summary::summary_lines(record) {
        if line.starts_with("flow status:") {
            if record.is_flow_completed() {
                println!("{}", line.green().bold());
            } else {
                println!("{}", line.red().bold());
            }
        } else {
            println!("{line}");
        }
    }
}

/// Print every summary field
pub fn print_full_summary(record: &SummaryRecord) {
    print_section("full summary");
    for line in summary::full_summary_lines(record) {
        println!("{line}");
    }
}

/// Print the DRC report, or note that the run has none
pub fn print_drc(report: Option<&DrcReport>) {
    print_section("DRC");
    match report {
        None => println!("{}", "no DRC file found".dimmed()),
        Some(report) if report.is_clean() => println!("{}", "no DRC violations".green()),
        Some(report) => {
            for line in report.lines() {
                println!("{line}");
            }
            println!(
                "{}",
                format!(
                    "{} rules broken, {} violations",
                    report.violations.len(),
                    report.total()
                )
                .red()
                .bold()
            );
        }
    }
}

/// Print the antenna report, or note that the run has none
pub fn print_antenna(report: Option<&AntennaReport>) {
    print_section("antenna");
    match report {
        None => println!("{}", "no antenna report found".dimmed()),
        Some(report) if report.is_clean() => println!("{}", "no antenna violations".green()),
        Some(report) => {
            let lines = report.lines();
            let Some((tally, checks)) = lines.split_last() else {
                return;
            };
            for line in checks {
                if line.ends_with("worth fixing") {
                    println!("{}", line.yellow());
                } else {
                    println!("{}", line.dimmed());
                }
            }
            let tally = if report.worth_fixing() > 0 {
                tally.yellow().bold()
            } else {
                tally.normal()
            };
            println!("{tally}");
        }
    }
}

/// Print what copy-final did
pub fn print_copy_report(report: &CopyReport) {
    print_section("copy final");
    println!(
        "copied {} files to {}",
        report.files,
        report.dest.display()
    );
    for file in &report.version_files {
        println!("  {}", file.display());
    }
    for name in &report.missing_version_files {
        println!("  {} {name} missing from run", "⚠".yellow().bold());
    }
}
