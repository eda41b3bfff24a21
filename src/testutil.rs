//! Shared test utilities
//!
//! Builders for fake OpenLANE run trees. Only compiled in test builds.

use std::fs;
use std::path::{Path, PathBuf};

/// Create `<root>/<design>/runs/<name>` and return its path
pub fn make_run_dir(root: &Path, design: &str, name: &str) -> PathBuf {
    let path = root.join(design).join("runs").join(name);
    fs::create_dir_all(&path).unwrap();
    path
}

/// Write `content` to `rel` under `dir`, creating parent directories
pub fn write_file(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Write a one-row summary CSV with the given fields to `rel` under `run`
pub fn write_summary(run: &Path, rel: &str, fields: &[(&str, &str)]) {
    let header: Vec<&str> = fields.iter().map(|(k, _)| *k).collect();
    let row: Vec<&str> = fields.iter().map(|(_, v)| *v).collect();
    write_file(
        run,
        rel,
        &format!("{}\n{}\n", header.join(","), row.join(",")),
    );
}
