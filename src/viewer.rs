//! External viewers
//!
//! Builds the command line for klayout, xdot and GDS3D and launches them
//! detached: the viewer keeps running after the summary exits.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};
use glob::Pattern;

use crate::artifact;
use crate::config::ViewerConfig;

/// Intermediate artifacts of a run that can be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Post-techmap netlist graph from yosys
    SynthGraph,
    /// Cell usage statistics from yosys
    YosysReport,
    /// Floorplan DEF
    Floorplan,
    /// Floorplan with the power distribution network
    Pdn,
    /// Global placement DEF
    GlobalPlacement,
    /// Detailed placement DEF
    DetailedPlacement,
    /// Final GDS
    Gds,
}

impl Artifact {
    /// Candidate paths inside the run directory, oldest OpenLANE layout first.
    ///
    /// `top` is matched literally, glob metacharacters included.
    #[must_use]
    pub fn patterns(self, top: &str) -> Vec<String> {
        let top = Pattern::escape(top);
        match self {
            Self::SynthGraph => vec![
                "tmp/synthesis/post_techmap.dot".to_string(),
                "tmp/synthesis/*post_techmap.dot".to_string(),
            ],
            Self::YosysReport => vec![
                "reports/synthesis/1-yosys_4.stat.rpt".to_string(),
                "reports/synthesis/*synthesis*.stat.rpt".to_string(),
            ],
            Self::Floorplan => vec![
                format!("results/floorplan/{top}.floorplan.def"),
                format!("results/floorplan/{top}.def"),
            ],
            Self::Pdn => vec![
                "tmp/floorplan/*pdn.def".to_string(),
                "tmp/floorplan/*pdn*.def".to_string(),
            ],
            Self::GlobalPlacement => vec![
                "tmp/placement/*replace.def".to_string(),
                "tmp/placement/*global.def".to_string(),
            ],
            Self::DetailedPlacement => vec![
                format!("results/placement/{top}.placement.def"),
                format!("results/placement/{top}.def"),
            ],
            Self::Gds => vec![
                format!("results/magic/{top}.gds"),
                format!("results/signoff/{top}.gds"),
                format!("results/final/gds/{top}.gds"),
            ],
        }
    }

    /// True for DEF artifacts, which need the merged LEF next to them
    #[must_use]
    pub const fn is_def(self) -> bool {
        matches!(
            self,
            Self::Floorplan | Self::Pdn | Self::GlobalPlacement | Self::DetailedPlacement
        )
    }

    /// Find this artifact in a run
    pub fn locate(self, run_dir: &Path, top: &str) -> Result<PathBuf> {
        artifact::locate_required(run_dir, &self.patterns(top))
    }
}

/// Merged LEF written by the flow, oldest layout first
const MERGED_LEF_PATTERNS: &[&str] = &["tmp/merged_unpadded.lef", "tmp/merged.lef"];

/// Name the DEF layer properties expect the LEF under
pub const STAGED_LEF_NAME: &str = "merged.lef";

/// Copy the run's merged LEF next to `def` so klayout can resolve the cells.
///
/// Returns the staged path, or `None` when the run has no merged LEF. An
/// existing file of the same name is left in place.
pub fn stage_merged_lef(run_dir: &Path, def: &Path) -> Result<Option<PathBuf>> {
    let dir = def
        .parent()
        .with_context(|| format!("DEF path has no parent: {}", def.display()))?;
    let target = dir.join(STAGED_LEF_NAME);
    if target.exists() {
        return Ok(Some(target));
    }

    let Some(lef) = artifact::locate(run_dir, MERGED_LEF_PATTERNS)? else {
        log::warn!("no merged LEF in {}, cells will show as boxes", run_dir.display());
        return Ok(None);
    };
    fs::copy(&lef, &target)
        .with_context(|| format!("Failed to stage {} as {}", lef.display(), target.display()))?;
    log::debug!("staged {} as {}", lef.display(), target.display());
    Ok(Some(target))
}

/// Standard cell library GDS of the sky130 high-density library
pub fn sky130_cells_gds(pdk_root: &Path) -> Result<PathBuf> {
    let path = pdk_root
        .join("sky130A")
        .join("libs.ref")
        .join("sky130_fd_sc_hd")
        .join("gds")
        .join("sky130_fd_sc_hd.gds");
    if path.is_file() {
        Ok(path)
    } else {
        Err(anyhow!("file not found: {}", path.display()))
    }
}

/// An external viewer program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    /// klayout with a layer properties file
    Klayout {
        /// Layer properties (`-l`), skipped when the file does not exist
        props: PathBuf,
    },
    /// xdot for graphviz files
    Xdot,
    /// GDS3D with a process definition
    Gds3d {
        /// Process definition (`-p`)
        tech: PathBuf,
    },
}

impl Viewer {
    /// klayout set up for DEF files
    #[must_use]
    pub fn klayout_def(config: &ViewerConfig) -> Self {
        Self::Klayout {
            props: config.klayout_def_props.clone(),
        }
    }

    /// klayout set up for GDS files
    #[must_use]
    pub fn klayout_gds(config: &ViewerConfig) -> Self {
        Self::Klayout {
            props: config.klayout_gds_props.clone(),
        }
    }

    /// GDS3D with the configured process definition
    #[must_use]
    pub fn gds3d(config: &ViewerConfig) -> Self {
        Self::Gds3d {
            tech: config.gds3d_tech.clone(),
        }
    }

    /// Executable name looked up on `PATH`
    #[must_use]
    pub const fn binary(&self) -> &'static str {
        match self {
            Self::Klayout { .. } => "klayout",
            Self::Xdot => "xdot",
            Self::Gds3d { .. } => "GDS3D",
        }
    }

    /// What to tell the user when the binary is missing
    #[must_use]
    pub const fn install_hint(&self) -> &'static str {
        match self {
            Self::Klayout { .. } => "pls install klayout from https://www.klayout.de",
            Self::Xdot => "pls install xdot from https://github.com/jrfonseca/xdot.py",
            Self::Gds3d { .. } => "pls install GDS3D from https://github.com/trilomix/GDS3D",
        }
    }

    /// Full path of the viewer, or an error with install instructions
    pub fn ensure_available(&self) -> Result<PathBuf> {
        which::which(self.binary()).map_err(|_| anyhow!("{}", self.install_hint()))
    }

    /// Command line showing `file` with `program` as the executable
    #[must_use]
    pub fn command(&self, program: &Path, file: &Path) -> Command {
        let mut cmd = Command::new(program);
        match self {
            Self::Klayout { props } => {
                if props.is_file() {
                    cmd.arg("-l").arg(props);
                } else {
                    log::warn!(
                        "layer properties {} not found, using klayout defaults",
                        props.display()
                    );
                }
                cmd.arg(file);
            }
            Self::Xdot => {
                cmd.arg(file);
            }
            Self::Gds3d { tech } => {
                cmd.arg("-p").arg(tech).arg("-i").arg(file);
            }
        }
        cmd
    }

    /// Launch the viewer on `file` without waiting for it
    pub fn launch(&self, file: &Path) -> Result<()> {
        let program = self.ensure_available()?;
        let mut cmd = self.command(&program, file);
        let child = cmd
            .stdin(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to launch {}", self.binary()))?;
        log::info!(
            "{} showing {} (pid {})",
            self.binary(),
            file.display(),
            child.id()
        );
        Ok(())
    }
}

/// Shows artifacts of one run
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    run_dir: &'a Path,
    top: &'a str,
    config: &'a ViewerConfig,
}

impl<'a> Dispatcher<'a> {
    /// Dispatcher for the run at `run_dir` with top module `top`
    #[must_use]
    pub const fn new(run_dir: &'a Path, top: &'a str, config: &'a ViewerConfig) -> Self {
        Self {
            run_dir,
            top,
            config,
        }
    }

    /// Viewer used for `artifact`; `None` for the yosys report, which is printed
    #[must_use]
    pub fn viewer_for(&self, artifact: Artifact) -> Option<Viewer> {
        match artifact {
            Artifact::YosysReport => None,
            Artifact::SynthGraph => Some(Viewer::Xdot),
            Artifact::Gds => Some(Viewer::klayout_gds(self.config)),
            a if a.is_def() => Some(Viewer::klayout_def(self.config)),
            _ => None,
        }
    }

    /// Resolve `artifact` and stage what its viewer needs. Returns the file to show.
    pub fn prepare(&self, artifact: Artifact) -> Result<PathBuf> {
        let path = artifact.locate(self.run_dir, self.top)?;
        if artifact.is_def() {
            stage_merged_lef(self.run_dir, &path)?;
        }
        Ok(path)
    }

    /// Open `artifact` in its viewer
    pub fn show(&self, artifact: Artifact) -> Result<()> {
        let viewer = self
            .viewer_for(artifact)
            .with_context(|| format!("{artifact:?} has no viewer"))?;
        // fail on a missing viewer before touching the run directory
        viewer.ensure_available()?;
        let path = self.prepare(artifact)?;
        viewer.launch(&path)
    }

    /// Open the final GDS in GDS3D
    pub fn show_3d(&self) -> Result<()> {
        let viewer = Viewer::gds3d(self.config);
        viewer.ensure_available()?;
        let path = self.prepare(Artifact::Gds)?;
        viewer.launch(&path)
    }

    /// Contents of the yosys cell usage report
    pub fn yosys_report(&self) -> Result<String> {
        let path = self.prepare(Artifact::YosysReport)?;
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read yosys report: {}", path.display()))
    }
}
