//! Core types shared by every Gatekeeper component.
//!
//! This crate holds the pieces that the card reader, the directory resolver
//! and the dispatch loop all agree on:
//!
//! - [`Swipe`]: the identifier and credential version extracted from one
//!   card read, at fixed byte offsets of the reader payload.
//! - [`Lcc`]: the numeric "last card code" used by the access policy to
//!   reject stale or lost cards.
//! - [`constants`]: wire-format offsets, sentinels and defaults.
//!
//! # Example
//!
//! ```
//! use gatekeeper_core::{Lcc, Swipe};
//!
//! let swipe = Swipe::extract(";912345678039999").unwrap();
//! assert_eq!(swipe.id(), "12345678");
//! assert_eq!(swipe.lcc(), "03");
//!
//! let lcc: Lcc = swipe.lcc().parse().unwrap();
//! assert_eq!(lcc.value(), 3);
//! ```

pub mod constants;
pub mod error;
pub mod lcc;
pub mod swipe;

pub use error::{CoreError, Result};
pub use lcc::Lcc;
pub use swipe::Swipe;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
