//! Directory service contract.
//!
//! The gate only needs two calls from the directory: find the account that
//! owns an employee number, and write back a newer card code. Everything
//! else about the directory (protocol, schema, sessions) stays behind
//! [`DirectoryService`].

#![allow(async_fn_in_trait)]

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One account record as stored in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    /// Login name of the account.
    pub net_id: String,

    /// Stored last card code, if the attribute is set.
    pub lcc: Option<String>,

    /// Groups the account is a direct member of.
    pub groups: Vec<String>,
}

impl DirectoryRecord {
    /// Create a record.
    pub fn new(
        net_id: impl Into<String>,
        lcc: Option<&str>,
        groups: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            net_id: net_id.into(),
            lcc: lcc.map(str::to_string),
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of an employee-number lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLookup {
    /// Directory-reported cardinality, e.g. `"1 user matched"`.
    pub match_summary: String,

    /// Matching records, in directory order.
    pub records: Vec<DirectoryRecord>,
}

impl UserLookup {
    /// Create a lookup result.
    pub fn new(match_summary: impl Into<String>, records: Vec<DirectoryRecord>) -> Self {
        Self {
            match_summary: match_summary.into(),
            records,
        }
    }
}

/// Account directory consulted on every swipe.
///
/// Implementations own their connection. `reconnect` replaces it and is
/// only called by the gate after a connection-level failure.
pub trait DirectoryService: Send + Sync {
    /// Look up accounts by employee number.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be queried. Zero or many
    /// matches are not errors; they are reported through
    /// [`UserLookup::match_summary`].
    async fn find_by_employee_id(&self, employee_id: &str) -> Result<UserLookup>;

    /// Store a new last card code on an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the write was not applied.
    async fn update_lcc(&self, net_id: &str, lcc: &str) -> Result<()>;

    /// Drop the current connection and establish a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the new connection cannot be established.
    async fn reconnect(&mut self) -> Result<()>;
}
