//! Environment and settings
//!
//! `Env` carries the two install roots the tool needs (`OPENLANE_ROOT`,
//! `PDK_ROOT`). `Settings` is the optional `summary.toml` with the antenna
//! heuristic and the viewer support files.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Settings file looked up in the working directory when `--config` is not given
pub const DEFAULT_SETTINGS_FILE: &str = "summary.toml";

/// Install roots read from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    /// `$OPENLANE_ROOT`, where `designs/` lives
    pub openlane_root: Option<PathBuf>,
    /// `$PDK_ROOT`, only needed to show the standard cell library
    pub pdk_root: Option<PathBuf>,
}

impl Env {
    /// Read the install roots from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the install roots through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        };
        Self {
            openlane_root: read("OPENLANE_ROOT"),
            pdk_root: read("PDK_ROOT"),
        }
    }

    /// `$OPENLANE_ROOT`, or an error telling the user to set it
    pub fn openlane_root(&self) -> Result<&Path> {
        self.openlane_root
            .as_deref()
            .ok_or_else(|| anyhow!("pls set OPENLANE_ROOT to where your OpenLANE is installed"))
    }

    /// `$PDK_ROOT`, or an error telling the user to set it
    pub fn pdk_root(&self) -> Result<&Path> {
        self.pdk_root
            .as_deref()
            .ok_or_else(|| anyhow!("pls set PDK_ROOT to where your PDK is installed"))
    }
}

/// Support files handed to the external viewers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewerConfig {
    /// klayout layer properties used for DEF files
    #[serde(default = "default_klayout_def_props")]
    pub klayout_def_props: PathBuf,
    /// klayout layer properties used for GDS files
    #[serde(default = "default_klayout_gds_props")]
    pub klayout_gds_props: PathBuf,
    /// GDS3D process definition
    #[serde(default = "default_gds3d_tech")]
    pub gds3d_tech: PathBuf,
}

fn default_klayout_def_props() -> PathBuf {
    PathBuf::from("klayout_def.xml")
}

fn default_klayout_gds_props() -> PathBuf {
    PathBuf::from("klayout_gds.xml")
}

fn default_gds3d_tech() -> PathBuf {
    PathBuf::from("sky130.txt")
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            klayout_def_props: default_klayout_def_props(),
            klayout_gds_props: default_klayout_gds_props(),
            gds3d_tech: default_gds3d_tech(),
        }
    }
}

/// Top-level settings parsed from summary.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// An antenna check is worth fixing when PAR exceeds this multiple of the allowed ratio
    #[serde(default = "default_antenna_multiplier")]
    pub antenna_multiplier: f64,
    /// Viewer support files
    #[serde(default)]
    pub viewer: ViewerConfig,
}

const fn default_antenna_multiplier() -> f64 {
    crate::report::antenna::DEFAULT_MULTIPLIER
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            antenna_multiplier: default_antenna_multiplier(),
            viewer: ViewerConfig::default(),
        }
    }
}

impl Settings {
    /// Parse a settings file from a path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse settings content from a string
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content).context("Failed to parse summary.toml")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings for this invocation.
    ///
    /// An explicit path must exist. Without one, `summary.toml` in `cwd` is
    /// used when present and the defaults otherwise.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        let fallback = cwd.join(DEFAULT_SETTINGS_FILE);
        if fallback.is_file() {
            log::debug!("loading settings from {}", fallback.display());
            Self::from_path(&fallback)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.antenna_multiplier.is_finite() || self.antenna_multiplier <= 0.0 {
            bail!(
                "antenna_multiplier must be a positive number, got {}",
                self.antenna_multiplier
            );
        }
        Ok(())
    }
}
