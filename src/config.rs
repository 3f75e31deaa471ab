//! Configuration file for pycefrl.
//!
//! Settings are read from YAML. Every field is optional; a missing file means
//! the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// File names looked up in the working directory, in order.
pub const LOCAL_CONFIG_FILES: &[&str] = &["pycefrl.yaml", ".pycefrl.yaml"];

/// Supported schema version.
pub const CONFIG_VERSION: &str = "1";

/// Written by `pycefrl init`.
pub const DEFAULT_CONFIG_YAML: &str = r#"# pycefrl configuration
version: "1"

# Repository identifier used in reports. Defaults to the analyzed directory's name.
# repository: my-project

# Glob patterns, relative to the analyzed directory, for files to skip.
excluded_paths:
  - "**/venv/**"
  - "**/__pycache__/**"

# Descend into directories whose names start with a dot.
include_hidden: false

# Worker threads. 0 means one per CPU.
jobs: 0
"#;

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Overrides the repository identifier.
    #[serde(default)]
    pub repository: Option<String>,
    /// Glob patterns for paths to exclude (e.g. "**/venv/**").
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default)]
    pub include_hidden: bool,
    /// 0 means one worker per CPU.
    #[serde(default)]
    pub jobs: usize,
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse_str(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        // An empty document deserializes to unit, not to a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        validate(&config)?;
        Ok(config)
    }

    /// Load the explicit file if given, otherwise the first discovered one,
    /// otherwise the defaults.
    pub fn load(explicit: Option<&Path>, working_dir: &Path) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::parse_file(path);
        }
        match discover(working_dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using config file");
                Self::parse_file(path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// First existing config file: local names in `working_dir`, then the user
/// config directory.
pub fn discover(working_dir: &Path) -> Option<PathBuf> {
    LOCAL_CONFIG_FILES
        .iter()
        .map(|name| working_dir.join(name))
        .chain(user_config_path())
        .find(|path| path.is_file())
}

/// `<config dir>/pycefrl/config.yaml` for the current user.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pycefrl").map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// Validate a configuration for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if !config.version.is_empty() && config.version != CONFIG_VERSION {
        anyhow::bail!(
            "unsupported config version {:?}, expected {:?}",
            config.version,
            CONFIG_VERSION
        );
    }

    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    if let Some(repo) = &config.repository {
        if repo.trim().is_empty() {
            anyhow::bail!("repository must not be empty");
        }
    }

    Ok(())
}

/// Write the default configuration to `path`, refusing to overwrite.
pub fn write_default(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    fs::write(path, DEFAULT_CONFIG_YAML)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
