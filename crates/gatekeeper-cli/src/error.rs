//! Error types for the gatekeeper binary.

use std::path::PathBuf;

/// Result type alias for binary setup.
pub type Result<T> = std::result::Result<T, CliError>;

/// Startup errors owned by the binary itself.
///
/// Reader, directory and strike failures keep their own error types and are
/// only joined at the top of `main`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The configuration file could not be read.
    #[error("Cannot read config file {}: {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file was read but is not usable.
    #[error("Invalid config file {}: {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },

    /// The log file could not be opened.
    #[error("Cannot open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl CliError {
    /// Create a new invalid config error.
    pub fn invalid_config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            path: path.into(),
            message: message.into(),
        }
    }
}
