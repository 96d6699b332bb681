//! User configuration: service port and result-set shaping.
//!
//! Read from a TOML file whose keys mirror the original settings panel
//! (`port`, `nbResults`, `sortScore`, `filterZeros`). Missing keys fall back
//! to their defaults individually.

use crate::error::ConfigError;
use crate::process::ProcessOptions;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable pointing at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "OMNISEARCH_INJECT_CONFIG";

/// Port the Omnisearch plugin's HTTP server listens on by default.
pub const DEFAULT_PORT: u16 = 51361;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Local port of the Omnisearch HTTP server; accepts a number or a numeric string.
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub port: u16,
    /// Number of results to display
    pub nb_results: usize,
    /// Sort by score (descending)
    pub sort_score: bool,
    /// Filter zero-score results
    pub filter_zeros: bool,
}

impl Default for Config {
    fn default() -> Self {
        let process = ProcessOptions::default();
        Self {
            port: DEFAULT_PORT,
            nb_results: process.nb_results,
            sort_score: process.sort_score,
            filter_zeros: process.filter_zeros,
        }
    }
}

impl Config {
    /// Resolve and load the configuration.
    ///
    /// Lookup order: `explicit`, then [`CONFIG_PATH_ENV`], then
    /// `<config dir>/omnisearch-inject/config.toml`. An explicitly named file
    /// must exist; the default location may be absent, in which case the
    /// defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Self::from_file(Path::new(&path));
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), port = config.port, "Loaded config");
        Ok(config)
    }

    /// Default config file location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("omnisearch-inject").join("config.toml"))
    }

    /// Options handed to [`crate::process`].
    pub fn process_options(&self) -> ProcessOptions {
        ProcessOptions {
            sort_score: self.sort_score,
            filter_zeros: self.filter_zeros,
            nb_results: self.nb_results,
        }
    }
}

fn port_from_number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPort {
        Number(u16),
        Text(String),
    }

    match RawPort::deserialize(deserializer)? {
        RawPort::Number(port) => Ok(port),
        RawPort::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port '{}'", text))),
    }
}
