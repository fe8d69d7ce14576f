//! Converter configuration, loaded from TOML.

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File names searched for in the input's directory and its ancestors.
const CANDIDATE_NAMES: &[&str] = &[".md2zim.toml", "md2zim.toml"];

/// Configuration for a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Width of one indentation level, used by definitions and lists.
    pub tab_width: usize,
    /// How far to scan for the `]` closing a link text before giving up.
    pub max_link_text_scan: usize,
    /// Maximum nesting of block quotes, loose list items and lists.
    pub max_depth: usize,
    /// Suffix appended to the input file stem for the default output path.
    pub output_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tab_width: 4,
            max_link_text_scan: 3000,
            max_depth: 64,
            output_suffix: "_md2zim".to_string(),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML source. `origin` is only used in errors.
    pub fn from_toml_str(source: &str, origin: &str) -> Result<Self> {
        let config: Config = toml::from_str(source).map_err(|e| ConfigError::Toml {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.tab_width == 0 {
            return Err(ConfigError::Invalid("tab_width must be at least 1".into()).into());
        }
        if self.max_link_text_scan == 0 {
            return Err(
                ConfigError::Invalid("max_link_text_scan must be at least 1".into()).into(),
            );
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()).into());
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<Config> {
    log::debug!("Reading config from: {}", path.display());
    let source = fs::read_to_string(path)?;
    let config = Config::from_toml_str(&source, &path.display().to_string())?;
    log::info!("Loaded config from: {}", path.display());
    Ok(config)
}

fn find_in_tree(start_dir: &Path) -> Option<PathBuf> {
    start_dir.ancestors().find_map(|dir| {
        CANDIDATE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    })
}

fn xdg_config_path() -> Option<PathBuf> {
    let base = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|home| Path::new(&home).join(".config")))
        .ok()?;
    let path = base.join("md2zim").join("config.toml");
    path.is_file().then_some(path)
}

/// Load configuration with precedence:
/// 1) explicit path (error if unreadable or invalid)
/// 2) walk up from `start_dir`: `.md2zim.toml`, `md2zim.toml`
/// 3) `$XDG_CONFIG_HOME/md2zim/config.toml` or `~/.config/md2zim/config.toml`
/// 4) defaults
pub fn load(explicit: Option<&Path>, start_dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let config = read_config(path)?;
        return Ok((config, Some(path.to_path_buf())));
    }

    for candidate in [find_in_tree(start_dir), xdg_config_path()].into_iter().flatten() {
        match read_config(&candidate) {
            Ok(config) => return Ok((config, Some(candidate))),
            Err(e) => log::warn!("Ignoring config {}: {}", candidate.display(), e),
        }
    }

    log::debug!("No config file found, using defaults");
    Ok((Config::default(), None))
}
