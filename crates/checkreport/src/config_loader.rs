//! Configuration discovery and loading.
//!
//! The config file is either given with `--config` or discovered as
//! `checkreport.toml` in the working directory. Its text goes through
//! environment expansion before it is parsed as TOML.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use checkreport_types::ConfigFile;

/// Name of the config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "checkreport.toml";

/// Load and parse one configuration file.
///
/// `expand_env` rewrites the raw text before parsing.
pub fn load_config<F>(path: &Path, expand_env: F) -> Result<ConfigFile>
where
    F: Fn(&str) -> Result<String>,
{
    debug!("Loading config from '{}'", path.display());

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    let expanded = expand_env(&text)
        .with_context(|| format!("expand environment in config '{}'", path.display()))?;

    toml::from_str(&expanded).with_context(|| format!("parse config '{}'", path.display()))
}

/// The config file to use: the explicit one, or `checkreport.toml` in `cwd`
/// when it exists.
pub fn discover_config(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let candidate = cwd.join(DEFAULT_CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}

/// Load the effective config, falling back to the built-in defaults when no
/// file is found. An explicit path that cannot be read is an error.
pub fn resolve_config<F>(explicit: Option<&Path>, cwd: &Path, expand_env: F) -> Result<ConfigFile>
where
    F: Fn(&str) -> Result<String>,
{
    match discover_config(explicit, cwd) {
        Some(path) => load_config(&path, expand_env),
        None => {
            debug!("No config file found in '{}', using built-in defaults", cwd.display());
            Ok(ConfigFile::default())
        }
    }
}
