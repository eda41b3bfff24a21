//! Run resolution
//!
//! Turns a design name and a selection (latest, by index, interactive, or the
//! best run of a regression sweep) into one run directory.

use std::fmt;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use super::{sort_runs, Run};
use crate::artifact;
use crate::config::Env;

/// Where the design's runs live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `$OPENLANE_ROOT/designs/<design>/runs`
    Designs,
    /// A Caravel user project: `./openlane/<design>/runs`, or `./<design>/runs`
    Caravel,
    /// Runs of a `run_designs.py` sweep, compared by violation count
    Regression,
}

/// How to pick among the runs of a design
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSelection {
    /// Most recently created run directory
    Latest,
    /// N-th run in timestamp order
    Index(usize),
    /// Ask on the terminal
    Interactive,
}

/// Query for one run of a design
#[derive(Debug, Clone, Copy)]
pub struct RunQuery<'a> {
    /// Design directory name
    pub design: &'a str,
    /// Directory layout to search
    pub layout: Layout,
    /// Selection rule; ignored for regression sweeps
    pub selection: RunSelection,
}

/// Lookup failures callers may want to tell apart
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunLookupError {
    /// No run directory exists for the design
    DesignNotFound {
        /// Design that was looked up
        design: String,
        /// Runs directory that was searched
        runs_dir: PathBuf,
    },
    /// Runs exist but none of them completed the flow
    NoSuccessfulRegressionRun {
        /// Design that was looked up
        design: String,
        /// Number of runs examined
        candidates: usize,
    },
    /// `--run N` past the end of the run list
    RunIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of runs available
        count: usize,
    },
}

impl fmt::Display for RunLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DesignNotFound { design, runs_dir } => write!(
                f,
                "design not found: no runs for '{design}' in {}",
                runs_dir.display()
            ),
            Self::NoSuccessfulRegressionRun { design, candidates } => write!(
                f,
                "no successful regression run for '{design}': none of {candidates} runs completed the flow"
            ),
            Self::RunIndexOutOfRange { index, count } => {
                write!(f, "run {index} out of range: only {count} runs (0..{count})")
            }
        }
    }
}

impl std::error::Error for RunLookupError {}

/// How the run was picked, for the header printed before any report
#[derive(Debug, Clone, PartialEq)]
pub enum Selected {
    /// Most recently created
    Latest,
    /// Given by index
    Index(usize),
    /// Chosen at the prompt
    Interactive(usize),
    /// Fewest violations among completed regression runs
    Regression {
        /// Violation total of the chosen run
        violations: f64,
    },
}

/// Result of resolution
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    /// The chosen run
    pub run: Run,
    /// How it was chosen
    pub selected: Selected,
}

/// Directory holding the runs of `design` for `layout`
pub fn runs_dir(env: &Env, cwd: &Path, design: &str, layout: Layout) -> Result<PathBuf> {
    let designs = match layout {
        Layout::Designs | Layout::Regression => env.openlane_root()?.join("designs"),
        Layout::Caravel => {
            let openlane = cwd.join("openlane");
            if openlane.is_dir() {
                openlane
            } else {
                cwd.to_path_buf()
            }
        }
    };
    Ok(designs.join(design).join("runs"))
}

/// Every run directory in `runs_dir`, sorted by timestamp
pub fn list_runs(runs_dir: &Path) -> Result<Vec<Run>> {
    let mut runs = Vec::new();
    for path in artifact::glob_in(runs_dir, "*")? {
        if path.is_dir() {
            runs.push(Run::from_path(&path)?);
        }
    }
    sort_runs(&mut runs);
    Ok(runs)
}

/// Index of the run with the most recent creation time
#[must_use]
pub fn latest(runs: &[Run]) -> Option<usize> {
    // max_by_key keeps the last maximum, so equal times favor the later name
    runs.iter()
        .enumerate()
        .max_by_key(|(_, r)| r.created)
        .map(|(i, _)| i)
}

/// Pick a run by index
pub fn by_index(runs: &[Run], index: usize) -> Result<&Run> {
    runs.get(index).ok_or_else(|| {
        RunLookupError::RunIndexOutOfRange {
            index,
            count: runs.len(),
        }
        .into()
    })
}

/// List runs on `output` and read a choice from `input`. Blank input picks the last run.
pub fn choose_interactively<R: BufRead, W: Write>(
    runs: &[Run],
    input: &mut R,
    output: &mut W,
) -> Result<usize> {
    let Some(last) = runs.len().checked_sub(1) else {
        bail!("no runs to choose from");
    };

    for (i, run) in runs.iter().enumerate() {
        let tag = if i == last { " <default>" } else { "" };
        writeln!(output, "{i:2}: {}{tag}", run.name).context("Failed to write run list")?;
    }
    write!(output, "which run? <enter for default>: ").context("Failed to write prompt")?;
    output.flush().context("Failed to flush prompt")?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read run choice")?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(last);
    }

    let index: usize = answer
        .parse()
        .with_context(|| format!("not a run number: '{answer}'"))?;
    by_index(runs, index)?;
    Ok(index)
}

/// Pick the completed run with the fewest violations.
///
/// Runs without a summary or with an unfinished flow are skipped. Ties go to
/// the earlier run in timestamp order.
pub fn best_regression_run(design: &str, runs: &[Run]) -> Result<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for (i, run) in runs.iter().enumerate() {
        let record = match run.summary() {
            Ok(record) => record,
            Err(e) => {
                log::info!("skipping {}: {e:#}", run.name);
                continue;
            }
        };
        if !record.is_flow_completed() {
            log::info!(
                "skipping {}: flow status {}",
                run.name,
                record.flow_status().unwrap_or("unknown")
            );
            continue;
        }

        let violations = record.violation_total();
        log::debug!("{}: {violations} violations", run.name);
        if best.map_or(true, |(_, fewest)| violations < fewest) {
            best = Some((i, violations));
        }
    }

    best.ok_or_else(|| {
        RunLookupError::NoSuccessfulRegressionRun {
            design: design.to_string(),
            candidates: runs.len(),
        }
        .into()
    })
}

/// Resolve `query` to one run. `input`/`output` are only used for interactive selection.
pub fn resolve_run<R: BufRead, W: Write>(
    env: &Env,
    cwd: &Path,
    query: &RunQuery<'_>,
    input: &mut R,
    output: &mut W,
) -> Result<ResolvedRun> {
    let dir = runs_dir(env, cwd, query.design, query.layout)?;
    log::debug!("looking for runs in {}", dir.display());
    let runs = list_runs(&dir)?;
    if runs.is_empty() {
        return Err(RunLookupError::DesignNotFound {
            design: query.design.to_string(),
            runs_dir: dir,
        }
        .into());
    }

    let (index, selected) = if query.layout == Layout::Regression {
        let (index, violations) = best_regression_run(query.design, &runs)?;
        (index, Selected::Regression { violations })
    } else {
        match query.selection {
            RunSelection::Latest => {
                let index = latest(&runs).context("no runs")?;
                (index, Selected::Latest)
            }
            RunSelection::Index(index) => {
                by_index(&runs, index)?;
                (index, Selected::Index(index))
            }
            RunSelection::Interactive => {
                let index = choose_interactively(&runs, input, output)?;
                (index, Selected::Interactive(index))
            }
        }
    };

    let run = runs.into_iter().nth(index).context("selected run vanished")?;
    Ok(ResolvedRun { run, selected })
}
