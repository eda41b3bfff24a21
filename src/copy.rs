//! Copy the final results of a run out of the OpenLANE tree

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

/// Results directory inside a run
pub const FINAL_RESULTS: &str = "results/final";

/// Files recording the tool and PDK versions a run was made with
pub const VERSION_FILES: [&str; 2] = ["OPENLANE_VERSION", "PDK_SOURCES"];

/// What [`copy_final`] copied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Destination directory
    pub dest: PathBuf,
    /// Number of files copied from the results directory
    pub files: usize,
    /// Version files copied next to the results
    pub version_files: Vec<PathBuf>,
    /// Version files the run did not have
    pub missing_version_files: Vec<&'static str>,
}

/// Copy `<run>/results/final` into `dest`, plus the version files.
///
/// Existing files in `dest` are overwritten; other files there are left alone.
pub fn copy_final(run_dir: &Path, dest: &Path) -> Result<CopyReport> {
    let src = run_dir.join(FINAL_RESULTS);
    if !src.is_dir() {
        bail!(
            "no final results in {} - did the run finish?",
            run_dir.display()
        );
    }

    let files = copy_tree(&src, dest)?;
    let mut report = CopyReport {
        dest: dest.to_path_buf(),
        files,
        ..CopyReport::default()
    };

    for name in VERSION_FILES {
        let from = run_dir.join(name);
        if !from.is_file() {
            log::warn!("{} has no {name}", run_dir.display());
            report.missing_version_files.push(name);
            continue;
        }
        let to = dest.join(name);
        fs::copy(&from, &to)
            .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
        report.version_files.push(to);
    }

    Ok(report)
}

/// Recursively copy `src` into `dest`, returning the number of files copied
fn copy_tree(src: &Path, dest: &Path) -> Result<usize> {
    let mut files = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .context("walked outside the source tree")?;
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory {}", target.display()))?;
        } else {
            fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
            files += 1;
        }
    }
    log::debug!("copied {files} files from {}", src.display());
    Ok(files)
}
