//! Directory-backed access decisions for Gatekeeper.
//!
//! Every swipe is resolved against the directory, which is the source of
//! truth for revocation; nothing is cached between swipes.
//!
//! # Components
//!
//! - [`DirectoryService`]: the two calls the gate needs (lookup by employee
//!   number, LCC write-back) plus reconnect.
//! - [`FreeIpaDirectory`]: the production backend (FreeIPA JSON-RPC).
//! - [`AccessPolicy`]: exactly one match, membership in an allowed group,
//!   and an LCC that is not older than the stored one.
//! - [`AccountResolver`]: runs the lookup, applies the policy, and writes
//!   back newer LCCs on a best-effort basis. Always returns an [`Account`].
//! - [`mock`]: in-memory directory for tests and bench setups.
//!
//! # Policy
//!
//! | Swiped vs stored LCC | Decision | Side effect |
//! |----------------------|----------|-------------|
//! | swiped < stored | deny | none |
//! | swiped = stored | grant | none |
//! | swiped > stored | grant | one LCC write; failure only logged |
//!
//! Any ambiguity (zero or several matches, missing group, non-numeric LCC,
//! directory failure) denies.

pub mod account;
pub mod error;
pub mod freeipa;
pub mod mock;
pub mod policy;
pub mod service;

pub use account::{Account, AccountResolver, LccUpdate};
pub use error::{DirectoryError, Result};
pub use freeipa::{FreeIpaConfig, FreeIpaDirectory};
pub use policy::{AccessDecision, AccessPolicy, DenyReason};
pub use service::{DirectoryRecord, DirectoryService, UserLookup};
