//! Tracing subscriber setup.
//!
//! Events go to stdout and, when a log location is configured, are appended
//! to `gatekeeper.log` as well. `RUST_LOG` overrides the default filter.

use crate::error::{CliError, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// File name used when the configured log location is a directory.
pub const LOG_FILE_NAME: &str = "gatekeeper.log";

/// Resolve the configured log location to a file path.
///
/// A path that already names `gatekeeper.log` is used as-is; anything else
/// is treated as the directory to put it in.
pub fn log_file_path(configured: &Path) -> PathBuf {
    if configured.file_name().is_some_and(|name| name == LOG_FILE_NAME) {
        configured.to_path_buf()
    } else {
        configured.join(LOG_FILE_NAME)
    }
}

/// Default filter directive for the given verbosity.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a subscriber is
/// already installed.
pub fn init(log_file: Option<&Path>, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| CliError::LogFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| CliError::LogFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stdout).with_target(false))
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/var/log/gatekeeper", "/var/log/gatekeeper/gatekeeper.log")]
    #[case("/var/log/gatekeeper/", "/var/log/gatekeeper/gatekeeper.log")]
    #[case("/var/log/gatekeeper.log", "/var/log/gatekeeper.log")]
    #[case("logs", "logs/gatekeeper.log")]
    fn test_log_file_path(#[case] configured: &str, #[case] expected: &str) {
        assert_eq!(log_file_path(Path::new(configured)), PathBuf::from(expected));
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "info");
        assert_eq!(default_directive(true), "debug");
    }
}
