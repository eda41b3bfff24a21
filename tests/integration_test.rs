#![allow(missing_docs)]

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use openlane_summary::report::{antenna, drc, summary};
use openlane_summary::run::Selected;
use openlane_summary::{
    copy_final, resolve_run, Env, Layout, ResolvedRun, RunLookupError, RunQuery, RunSelection,
    Verdict,
};

const SUMMARY_CSV: &str = "\
design,design_name,config,flow_status,DIEAREA_mm^2,tritonRoute_violations,Magic_violations,antenna_violations,lvs_total_errors
/openlane/designs/spm,spm,RUN_2022.08.22_19.14.37,flow_completed,0.0001,0,3,2,0
";

const MAGIC_DRC: &str = "\
spm
----------------------------------------
Metal2 spacing < 0.14um (met2.2)
----------------------------------------
 12.000um 4.000um 12.140um 4.500um
 14.000um 4.000um 14.140um 4.500um
 16.000um 4.000um 16.140um 4.500um
----------------------------------------
[INFO]: COUNT: 3
";

const ANTENNA_RPT: &str = "\
_0042_
  _123_/A  (sky130_fd_sc_hd__buf_2)
    [1] met1:
      PAR:    5.00*  Ratio:   2.00      (Area)
_0043_
  _124_/B  (sky130_fd_sc_hd__nor2_1)
    [1] met3:
      PAR:    5.00*  Ratio:   1.00      (Area)
";

fn write(path: &Path, content: impl AsRef<[u8]>) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Lay out `$OPENLANE_ROOT/designs/spm/runs/<name>` with a complete set of reports
fn make_complete_run(openlane_root: &Path, name: &str) -> PathBuf {
    let run = openlane_root.join("designs/spm/runs").join(name);
    write(&run.join("reports/final_summary_report.csv"), SUMMARY_CSV);
    write(&run.join("logs/magic/magic.drc"), MAGIC_DRC);
    write(&run.join("reports/routing/25-antenna.rpt"), ANTENNA_RPT);
    write(&run.join("results/final/gds/spm.gds"), [0u8, 6, 0, 2, 0, 5]);
    write(&run.join("results/final/verilog/gl/spm.v"), "module spm();\nendmodule\n");
    write(&run.join("OPENLANE_VERSION"), "OpenLane v0.23\n");
    write(&run.join("PDK_SOURCES"), "open_pdks 8fe7f760ece2bb49b1c310e60243f0558977dae5\n");
    run
}

fn env_for(root: &Path) -> Env {
    Env {
        openlane_root: Some(root.to_path_buf()),
        pdk_root: None,
    }
}

fn resolve(env: &Env, cwd: &Path, design: &str, layout: Layout) -> anyhow::Result<ResolvedRun> {
    let query = RunQuery {
        design,
        layout,
        selection: RunSelection::Latest,
    };
    let mut input = Cursor::new(Vec::<u8>::new());
    let mut output: Vec<u8> = Vec::new();
    resolve_run(env, cwd, &query, &mut input, &mut output)
}

/// Integration test: latest run → summary, DRC and antenna reports.
#[test]
fn test_latest_run_reports() {
    let root = TempDir::new().unwrap();
    let run = make_complete_run(root.path(), "RUN_2022.08.22_19.14.37");

    let resolved = resolve(&env_for(root.path()), root.path(), "spm", Layout::Designs).unwrap();
    assert_eq!(resolved.run.path, run);
    assert_eq!(resolved.selected, Selected::Latest);

    let record = resolved.run.summary().unwrap();
    let lines = summary::summary_lines(&record);
    assert_eq!(lines.len(), 6);
    assert!(lines.contains(&"area 100.0 um^2".to_string()));
    assert_eq!(lines.last().unwrap(), "flow status: flow_completed");

    let drc = drc::load_from_run(&run).unwrap().unwrap();
    assert_eq!(drc.lines(), vec!["* Metal2 spacing < 0.14um (met2.2) (3)"]);

    let antenna = antenna::load_from_run(&run, antenna::DEFAULT_MULTIPLIER)
        .unwrap()
        .unwrap();
    let verdicts: Vec<_> = antenna.violations.iter().map(|v| v.verdict).collect();
    assert_eq!(verdicts, vec![Verdict::CanIgnore, Verdict::WorthFixing]);
}

/// Integration test: missing optional reports are clean, not errors.
#[test]
fn test_missing_optional_reports_are_clean() {
    let root = TempDir::new().unwrap();
    let run = root.path().join("designs/spm/runs/RUN_2022.08.22_19.14.37");
    write(&run.join("reports/final_summary_report.csv"), SUMMARY_CSV);

    assert!(drc::load_from_run(&run).unwrap().is_none());
    assert!(antenna::load_from_run(&run, 2.0).unwrap().is_none());
}

/// Integration test: an unknown design fails before anything else happens.
#[test]
fn test_unknown_design() {
    let root = TempDir::new().unwrap();
    make_complete_run(root.path(), "RUN_2022.08.22_19.14.37");

    let err = resolve(&env_for(root.path()), root.path(), "nope", Layout::Designs).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RunLookupError>(),
        Some(RunLookupError::DesignNotFound { .. })
    ));
}

/// Integration test: a sweep with no completed run is not the same failure as no runs.
#[test]
fn test_regression_without_success_is_distinct() {
    let root = TempDir::new().unwrap();
    let run = make_complete_run(root.path(), "config_1");
    write(
        &run.join("reports/final_summary_report.csv"),
        SUMMARY_CSV.replace("flow_completed", "flow failed"),
    );

    let err = resolve(&env_for(root.path()), root.path(), "spm", Layout::Regression).unwrap_err();
    let lookup = err.downcast_ref::<RunLookupError>().unwrap();
    assert!(matches!(lookup, RunLookupError::NoSuccessfulRegressionRun { .. }));
    assert!(!err.to_string().contains("design not found"));
}

/// Integration test: copy-final reproduces results and version files byte for byte.
#[test]
fn test_copy_final_end_to_end() {
    let root = TempDir::new().unwrap();
    let run = make_complete_run(root.path(), "RUN_2022.08.22_19.14.37");
    let work = TempDir::new().unwrap();

    let report = copy_final(&run, &work.path().join("final")).unwrap();
    assert_eq!(report.files, 2);

    for rel in ["gds/spm.gds", "verilog/gl/spm.v"] {
        assert_eq!(
            fs::read(work.path().join("final").join(rel)).unwrap(),
            fs::read(run.join("results/final").join(rel)).unwrap(),
            "{rel}"
        );
    }
    for name in ["OPENLANE_VERSION", "PDK_SOURCES"] {
        assert_eq!(
            fs::read(work.path().join("final").join(name)).unwrap(),
            fs::read(run.join(name)).unwrap(),
            "{name}"
        );
    }
}

fn summary_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_summary"))
}

/// Binary: missing OPENLANE_ROOT is fatal with an instructive message.
#[test]
fn test_binary_requires_openlane_root() {
    let work = TempDir::new().unwrap();
    let output = summary_bin()
        .args(["--design", "spm", "--summary"])
        .env_remove("OPENLANE_ROOT")
        .current_dir(work.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("OPENLANE_ROOT"), "{stderr}");
}

/// Binary: unknown design exits non-zero and prints nothing to stdout.
#[test]
fn test_binary_unknown_design() {
    let root = TempDir::new().unwrap();
    let output = summary_bin()
        .args(["--design", "nope", "--summary"])
        .env("OPENLANE_ROOT", root.path())
        .current_dir(root.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("design not found"), "{stderr}");
}

/// Binary: summary of the latest run.
#[test]
fn test_binary_summary() {
    let root = TempDir::new().unwrap();
    make_complete_run(root.path(), "RUN_2022.08.22_19.14.37");
    let output = summary_bin()
        .args(["--design", "spm", "--summary", "--drc"])
        .env("OPENLANE_ROOT", root.path())
        .env("NO_COLOR", "1")
        .current_dir(root.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("using latest run:"), "{stdout}");
    assert!(stdout.contains("area 100.0 um^2"), "{stdout}");
    assert!(stdout.contains("flow status: flow_completed"), "{stdout}");
    assert!(stdout.contains("(met2.2) (3)"), "{stdout}");
}

/// Binary: a missing viewer is fatal and says where to get it.
#[test]
fn test_binary_missing_viewer() {
    let root = TempDir::new().unwrap();
    make_complete_run(root.path(), "RUN_2022.08.22_19.14.37");
    for (flag, hint) in [("--gds-3d", "pls install GDS3D"), ("--gds", "pls install klayout")] {
        let output = summary_bin()
            .args(["--design", "spm", flag])
            .env("OPENLANE_ROOT", root.path())
            .env("PATH", "")
            .current_dir(root.path())
            .output()
            .unwrap();
        assert!(!output.status.success(), "{flag}");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains(hint), "{flag}: {stderr}");
    }
}

/// Binary: run-level flags next to --show-sky130 still need a design.
#[test]
fn test_binary_show_sky130_with_run_flags_needs_design() {
    let work = TempDir::new().unwrap();
    let output = summary_bin()
        .args(["--show-sky130", "--summary", "--drc", "--copy-final"])
        .env_remove("OPENLANE_ROOT")
        .env("PDK_ROOT", work.path())
        .current_dir(work.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--design"), "{stderr}");
}

/// Binary: markdown report of the latest run.
#[test]
fn test_binary_markdown_report() {
    let root = TempDir::new().unwrap();
    make_complete_run(root.path(), "RUN_2022.08.22_19.14.37");
    let output = summary_bin()
        .args(["--design", "spm", "--report"])
        .env("OPENLANE_ROOT", root.path())
        .env("NO_COLOR", "1")
        .current_dir(root.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("## spm : DESIGN=spm RUN_DATE=RUN_2022.08.22_19.14.37"),
        "{stdout}"
    );
    assert!(stdout.contains("area 100.0 um^2"), "{stdout}");
    assert!(stdout.contains("(met2.2) (3)"), "{stdout}");
}
