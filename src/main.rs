//! openlane-summary - OpenLANE run reporter
//!
//! CLI entry point.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, ArgGroup, Parser};

use openlane_summary::cli::{display, init_logging, print_run_header};
use openlane_summary::report::{antenna, drc};
use openlane_summary::viewer::{sky130_cells_gds, Viewer};
use openlane_summary::{
    copy_final, resolve_run, Artifact, Dispatcher, Env, Layout, ResolvedRun, RunQuery,
    RunSelection, Settings,
};

/// Summarize OpenLANE runs
///
/// Picks the latest run of a design (or the one asked for), prints its
/// violations, DRC and antenna reports, and opens intermediate layouts in
/// klayout, xdot or GDS3D.
#[derive(Parser, Debug)]
#[command(name = "summary", version, about)]
#[command(group(
    ArgGroup::new("run_request")
        .multiple(true)
        .requires("design")
        .args([
            "top", "run", "regression", "caravel", "summary", "full_summary", "drc",
            "antenna", "report", "synth", "yosys_report", "copy_final", "floorplan",
            "pdn", "global_placement", "detailed_placement", "gds", "gds_3d",
        ])
))]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Design to report on (directory name under designs/)
    #[arg(long, required_unless_present = "show_sky130")]
    design: Option<String>,

    /// Name of the top module if not the same as the design
    #[arg(long)]
    top: Option<String>,

    /// Choose a run by number in date order; without a number, show a menu.
    /// Defaults to the latest run
    #[arg(long, value_name = "N", num_args = 0..=1, conflicts_with = "regression")]
    run: Option<Option<usize>>,

    /// Pick the completed run with the fewest violations from a regression sweep
    #[arg(long, conflicts_with = "caravel")]
    regression: bool,

    /// Look for runs in a Caravel user project (./openlane/<design>/runs)
    #[arg(long)]
    caravel: bool,

    /// Show violations, area and flow status
    #[arg(long)]
    summary: bool,

    /// Show every field of the summary report
    #[arg(long)]
    full_summary: bool,

    /// Show the DRC report
    #[arg(long)]
    drc: bool,

    /// Show the antenna report
    #[arg(long)]
    antenna: bool,

    /// Markdown report: a `## <design>` heading, then the summary and DRC
    #[arg(long)]
    report: bool,

    /// Show the post-techmap netlist graph in xdot
    #[arg(long)]
    synth: bool,

    /// Show cell usage after yosys synthesis
    #[arg(long)]
    yosys_report: bool,

    /// Copy the run's final results to ./final
    #[arg(long)]
    copy_final: bool,

    /// Show the floorplan in klayout
    #[arg(long)]
    floorplan: bool,

    /// Show the power distribution network in klayout
    #[arg(long)]
    pdn: bool,

    /// Show the global placement in klayout
    #[arg(long)]
    global_placement: bool,

    /// Show the detailed placement in klayout
    #[arg(long)]
    detailed_placement: bool,

    /// Show the final GDS in klayout
    #[arg(long)]
    gds: bool,

    /// Show the final GDS in GDS3D
    #[arg(long)]
    gds_3d: bool,

    /// Show all sky130 high-density standard cells in klayout (needs PDK_ROOT)
    #[arg(long)]
    show_sky130: bool,

    /// Settings file (defaults to ./summary.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Directory layout requested by the flags
    const fn layout(&self) -> Layout {
        if self.regression {
            Layout::Regression
        } else if self.caravel {
            Layout::Caravel
        } else {
            Layout::Designs
        }
    }

    /// Run selection requested by `--run`
    const fn selection(&self) -> RunSelection {
        match self.run {
            None => RunSelection::Latest,
            Some(None) => RunSelection::Interactive,
            Some(Some(n)) => RunSelection::Index(n),
        }
    }

    /// Viewer artifacts requested, in the order they are opened
    fn requested_views(&self) -> Vec<Artifact> {
        [
            (self.synth, Artifact::SynthGraph),
            (self.floorplan, Artifact::Floorplan),
            (self.pdn, Artifact::Pdn),
            (self.global_placement, Artifact::GlobalPlacement),
            (self.detailed_placement, Artifact::DetailedPlacement),
            (self.gds, Artifact::Gds),
        ]
        .into_iter()
        .filter_map(|(wanted, artifact)| wanted.then_some(artifact))
        .collect()
    }
}

/// Print the reports and open the viewers requested for one run
fn report_on_run(cli: &Cli, resolved: &ResolvedRun, settings: &Settings, cwd: &Path) -> Result<()> {
    let run_dir = &resolved.run.path;
    let design = cli.design.as_deref().unwrap_or_default();
    let top = cli.top.as_deref().unwrap_or(design);

    if cli.report {
        println!("{}", display::report_heading(design, &resolved.run.name));
    }

    let summary = cli.summary || cli.report;
    if summary || cli.full_summary {
        let record = resolved.run.summary()?;
        if summary {
            display::print_summary(&record);
        }
        if cli.full_summary {
            display::print_full_summary(&record);
        }
    }

    if cli.drc || cli.report {
        let report = drc::load_from_run(run_dir)?;
        display::print_drc(report.as_ref());
    }

    if cli.antenna {
        let report = antenna::load_from_run(run_dir, settings.antenna_multiplier)?;
        display::print_antenna(report.as_ref());
    }

    let dispatcher = Dispatcher::new(run_dir, top, &settings.viewer);

    if cli.yosys_report {
        print!("{}", dispatcher.yosys_report()?);
    }

    for artifact in cli.requested_views() {
        dispatcher
            .show(artifact)
            .with_context(|| format!("Failed to show {artifact:?}"))?;
    }

    if cli.gds_3d {
        dispatcher.show_3d()?;
    }

    if cli.copy_final {
        let report = copy_final(run_dir, &cwd.join("final"))?;
        display::print_copy_report(&report);
    }

    Ok(())
}

/// Open the sky130 standard cell library in klayout
fn show_sky130(env: &Env, settings: &Settings) -> Result<()> {
    let gds = sky130_cells_gds(env.pdk_root()?)?;
    Viewer::klayout_gds(&settings.viewer).launch(&gds)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let env = Env::from_env();
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let settings = Settings::load(cli.config.as_deref(), &cwd)?;

    if let Some(design) = cli.design.as_deref() {
        let query = RunQuery {
            design,
            layout: cli.layout(),
            selection: cli.selection(),
        };
        let stdin = std::io::stdin();
        let resolved = resolve_run(
            &env,
            &cwd,
            &query,
            &mut stdin.lock(),
            &mut std::io::stdout(),
        )?;
        print_run_header(&resolved);
        report_on_run(&cli, &resolved, &settings, &cwd)?;
    }

    if cli.show_sky130 {
        show_sky130(&env, &settings)?;
    }

    Ok(())
}
