//! Configuration loading utilities
//!
//! Settings are layered, highest priority first:
//! 1. CLI arguments
//! 2. Environment variables
//! 3. Config file (searched in standard locations)
//! 4. Built-in defaults

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde::de::DeserializeOwned;

use crate::APP_NAME;

/// Describes where a configuration was loaded from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Explicit path provided via CLI or env var
    Explicit(PathBuf),
    /// Found in current working directory
    CurrentDir(PathBuf),
    /// Found in XDG config home (~/.config/cityweather/)
    XdgConfig(PathBuf),
    /// Found in system config (/etc/cityweather/)
    System(PathBuf),
    /// No config file found, using defaults
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConfigSource::Explicit(p)
            | ConfigSource::CurrentDir(p)
            | ConfigSource::XdgConfig(p)
            | ConfigSource::System(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path() {
            Some(p) => write!(f, "{}", p.display()),
            None => write!(f, "(defaults)"),
        }
    }
}

/// Find a configuration file in standard locations
///
/// Search order:
/// 1. Environment variable (e.g. CITYWEATHER_DAEMON_CONFIG)
/// 2. Current directory
/// 3. XDG config home ($XDG_CONFIG_HOME/cityweather/ or ~/.config/cityweather/)
/// 4. System config (/etc/cityweather/)
///
/// # Arguments
/// * `env_var` - Environment variable to check for explicit path
/// * `filename` - Config filename to search for (e.g. "daemon.toml")
pub fn find_config_file(env_var: &str, filename: &str) -> ConfigSource {
    let candidates = [
        env::var(env_var).ok().map(|p| ConfigSource::Explicit(PathBuf::from(p))),
        Some(ConfigSource::CurrentDir(PathBuf::from(filename))),
        Some(ConfigSource::XdgConfig(get_xdg_config_path(filename))),
        Some(ConfigSource::System(
            PathBuf::from("/etc").join(APP_NAME).join(filename),
        )),
    ];

    candidates
        .into_iter()
        .flatten()
        .find(|source| source.path().is_some_and(|p| p.exists()))
        .unwrap_or(ConfigSource::Defaults)
}

/// Get the XDG config path for a given filename
fn get_xdg_config_path(filename: &str) -> PathBuf {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join(APP_NAME).join(filename)
    } else if let Ok(home) = env::var("HOME") {
        PathBuf::from(home)
            .join(".config")
            .join(APP_NAME)
            .join(filename)
    } else {
        PathBuf::from(".config").join(APP_NAME).join(filename)
    }
}

/// Load and parse a TOML configuration file
///
/// Returns `T::default()` when the source is [`ConfigSource::Defaults`].
pub fn load_config<T: DeserializeOwned + Default>(source: &ConfigSource) -> anyhow::Result<T> {
    match source.path() {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            let config: T = toml::from_str(&content)
                .with_context(|| format!("failed to parse config file {}", path.display()))?;
            Ok(config)
        }
        None => Ok(T::default()),
    }
}
