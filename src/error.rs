//! Error handling types and utilities.
//!
//! Only conditions the user can act on become errors. Malformed service
//! payloads and malformed excerpt markup are recovered locally and never
//! reach these types.

use std::path::PathBuf;

/// A specialized Result type for the binary and other top-level glue.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` at the call sites.
pub type Result<T> = anyhow::Result<T>;

/// Failure talking to the local Omnisearch HTTP service.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The service could not be reached or the connection broke mid-response.
    #[error("Omnisearch service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered, but with a non-success status.
    #[error("Omnisearch service returned HTTP {0}")]
    Status(reqwest::StatusCode),
}

/// Error returned when loading the configuration file fails.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
