//! Artifact lookup inside a run directory
//!
//! OpenLANE has moved its reports and results around between releases, so
//! every artifact is described by a list of glob patterns relative to the run
//! directory. Patterns are tried in order and the first one that matches
//! anything wins.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glob::Pattern;

/// Expand `pattern` relative to `base`, returning matches in sorted order.
pub fn glob_in(base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let base_str = base
        .to_str()
        .with_context(|| format!("Path is not valid UTF-8: {}", base.display()))?;
    let full = format!("{}/{pattern}", Pattern::escape(base_str.trim_end_matches('/')));

    let mut matches = Vec::new();
    for entry in glob::glob(&full).with_context(|| format!("Invalid glob pattern: {full}"))? {
        let path = entry.with_context(|| format!("Failed to read matches of {full}"))?;
        matches.push(path);
    }
    matches.sort();
    Ok(matches)
}

/// Resolve the single file matched by `pattern` under `base`.
///
/// Zero matches is an error. More than one match is reported as a warning
/// listing the candidates and is then an error too, since picking one would
/// silently show the wrong file.
pub fn find_one(base: &Path, pattern: &str) -> Result<PathBuf> {
    let mut matches = glob_in(base, pattern)?;
    match matches.len() {
        0 => bail!("file not found: {}", base.join(pattern).display()),
        1 => Ok(matches.remove(0)),
        n => {
            log::warn!("glob pattern {pattern} matched {n} files:");
            for m in &matches {
                log::warn!("    {}", m.display());
            }
            bail!(
                "ambiguous file pattern {}: {n} matches",
                base.join(pattern).display()
            )
        }
    }
}

/// Resolve the first pattern in `patterns` that matches anything under `base`.
///
/// Returns `Ok(None)` when no pattern matches. A pattern with several matches
/// is handled as in [`find_one`].
pub fn locate<S: AsRef<str>>(base: &Path, patterns: &[S]) -> Result<Option<PathBuf>> {
    for pattern in patterns {
        let pattern = pattern.as_ref();
        if glob_in(base, pattern)?.is_empty() {
            log::debug!("no match for {pattern} in {}", base.display());
            continue;
        }
        return find_one(base, pattern).map(Some);
    }
    Ok(None)
}

/// Like [`locate`] but a missing artifact is an error naming every pattern tried.
pub fn locate_required<S: AsRef<str>>(base: &Path, patterns: &[S]) -> Result<PathBuf> {
    if let Some(path) = locate(base, patterns)? {
        return Ok(path);
    }
    let tried: Vec<String> = patterns
        .iter()
        .map(|p| base.join(p.as_ref()).display().to_string())
        .collect();
    bail!("file not found: {}", tried.join(" or "))
}
