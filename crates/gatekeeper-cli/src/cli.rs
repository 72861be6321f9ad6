//! Command-line arguments.

use crate::config::{Config, DEFAULT_CONFIG_PATH};
use clap::Parser;
use gatekeeper_reader::ReaderMode;
use gatekeeper_strike::StrikeMethod;
use std::path::PathBuf;

/// Gatekeeper - open the door for authorized card swipes.
#[derive(Debug, Parser)]
#[command(name = "gatekeeper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "GATEKEEPER_CONFIG")]
    pub config: PathBuf,

    /// Door strike backend, overriding the config file
    #[arg(short, long, value_enum)]
    pub strike: Option<CliStrike>,

    /// Card reader input, overriding the config file
    #[arg(short, long, value_enum)]
    pub reader: Option<CliReader>,

    /// Input device for the raw reader
    #[arg(short, long)]
    pub device: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Strike backend options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliStrike {
    /// Log only
    Fake,
    /// Serial strike controller
    #[value(alias = "arduino")]
    Serial,
    /// GPIO line
    #[value(alias = "pi")]
    Gpio,
}

impl From<CliStrike> for StrikeMethod {
    fn from(strike: CliStrike) -> Self {
        match strike {
            CliStrike::Fake => StrikeMethod::Fake,
            CliStrike::Serial => StrikeMethod::Serial,
            CliStrike::Gpio => StrikeMethod::Gpio,
        }
    }
}

/// Card reader options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliReader {
    /// Lines on standard input
    Stdin,
    /// Input events from a device file
    Raw,
}

impl From<CliReader> for ReaderMode {
    fn from(reader: CliReader) -> Self {
        match reader {
            CliReader::Stdin => ReaderMode::Stdin,
            CliReader::Raw => ReaderMode::Raw,
        }
    }
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(strike) = self.strike {
            config.strike.method = strike.into();
        }
        if let Some(reader) = self.reader {
            config.reader.mode = reader.into();
        }
        if let Some(device) = &self.device {
            config.reader.device = Some(device.clone());
        }
    }
}
