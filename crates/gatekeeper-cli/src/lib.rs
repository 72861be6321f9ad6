//! The `gatekeeper` binary's building blocks.
//!
//! - [`cli`]: command-line arguments and overrides
//! - [`config`]: TOML configuration file
//! - [`logging`]: stdout + log file subscriber
//! - [`gate`]: the dispatch loop tying reader, directory and strike together
//! - [`runtime`]: the tokio runtime and its shutdown deadline

pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod logging;
pub mod runtime;

pub use cli::Cli;
pub use config::Config;
pub use error::{CliError, Result};
pub use gate::{Gate, GateOutcome, GateStats};
