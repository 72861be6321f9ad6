//! Configuration file loading.
//!
//! The gate reads a single TOML file at startup. Only `[credentials]` is
//! required; every other section falls back to defaults.
//!
//! ```toml
//! [logging]
//! log = "/var/log/gatekeeper"
//!
//! [credentials]
//! host = "ipa.example.org"
//! verify_ssl = true
//! username = "gatekeeper"
//! password = "secret"
//!
//! [access]
//! allowed_groups = ["users"]
//!
//! [strike]
//! method = "serial"
//!
//! [reader]
//! mode = "raw"
//! device = "/dev/input/event0"
//! ```

use crate::error::{CliError, Result};
use gatekeeper_core::constants::{DEFAULT_ACCESS_GROUP, DEFAULT_STRIKE_DWELL_MS, DEFAULT_STRIKE_PIN};
use gatekeeper_directory::{AccessPolicy, FreeIpaConfig};
use gatekeeper_reader::ReaderMode;
use gatekeeper_strike::{StrikeMethod, StrikeSettings};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "gatekeeper.toml";

/// Complete gate configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Log file settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory login
    pub credentials: Credentials,

    /// Access policy
    #[serde(default)]
    pub access: AccessConfig,

    /// Door strike backend
    #[serde(default)]
    pub strike: StrikeConfig,

    /// Card reader input
    #[serde(default)]
    pub reader: ReaderConfig,
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log directory, or the log file itself.
    pub log: Option<PathBuf>,
}

/// `[credentials]` section.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub host: String,

    #[serde(default = "default_true")]
    pub verify_ssl: bool,

    pub username: String,

    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("verify_ssl", &self.verify_ssl)
            .field("username", &self.username)
            .field("password", &"*****")
            .finish()
    }
}

impl Credentials {
    /// Connection settings for the FreeIPA client.
    pub fn to_freeipa(&self) -> FreeIpaConfig {
        FreeIpaConfig {
            host: self.host.clone(),
            verify_ssl: self.verify_ssl,
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// `[access]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessConfig {
    /// Membership in any of these groups is required.
    #[serde(default = "default_allowed_groups")]
    pub allowed_groups: Vec<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            allowed_groups: default_allowed_groups(),
        }
    }
}

impl AccessConfig {
    /// Build the access policy.
    pub fn policy(&self) -> AccessPolicy {
        AccessPolicy::new(self.allowed_groups.iter().map(String::as_str))
    }
}

/// `[strike]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StrikeConfig {
    #[serde(default)]
    pub method: StrikeMethod,

    #[serde(default = "default_gpio_pin")]
    pub gpio_pin: u32,

    #[serde(default = "default_dwell_ms")]
    pub dwell_ms: u64,
}

impl Default for StrikeConfig {
    fn default() -> Self {
        Self {
            method: StrikeMethod::default(),
            gpio_pin: DEFAULT_STRIKE_PIN,
            dwell_ms: DEFAULT_STRIKE_DWELL_MS,
        }
    }
}

impl StrikeConfig {
    /// Backend settings for the strike factory.
    pub fn settings(&self) -> StrikeSettings {
        StrikeSettings {
            gpio_pin: self.gpio_pin,
            dwell: Duration::from_millis(self.dwell_ms),
        }
    }
}

/// `[reader]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReaderConfig {
    #[serde(default)]
    pub mode: ReaderMode,

    /// Input device, raw mode only.
    pub device: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_allowed_groups() -> Vec<String> {
    vec![DEFAULT_ACCESS_GROUP.to_string()]
}

fn default_gpio_pin() -> u32 {
    DEFAULT_STRIKE_PIN
}

fn default_dwell_ms() -> u64 {
    DEFAULT_STRIKE_DWELL_MS
}

impl Config {
    /// Load and validate the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, is not valid TOML, lacks
    /// `[credentials]`, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    /// Parse and validate configuration text. `path` is only used in errors.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`], minus the read.
    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).map_err(|e| CliError::invalid_config(path, e.message()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.credentials.host.trim().is_empty() {
            return Err(CliError::invalid_config(path, "credentials.host is empty"));
        }
        if self.credentials.username.trim().is_empty() {
            return Err(CliError::invalid_config(path, "credentials.username is empty"));
        }
        if self.access.allowed_groups.is_empty() {
            return Err(CliError::invalid_config(
                path,
                "access.allowed_groups must name at least one group",
            ));
        }
        if self.reader.mode == ReaderMode::Raw && self.reader.device.is_none() {
            return Err(CliError::invalid_config(
                path,
                "reader.device is required in raw mode",
            ));
        }
        Ok(())
    }
}
