//! Access policy evaluation.
//!
//! The policy is a pure function of one directory lookup and the swiped card
//! code. It fails closed: every unexpected shape of the lookup is a denial.

use gatekeeper_core::Lcc;
use gatekeeper_core::constants::{DEFAULT_ACCESS_GROUP, ONE_USER_MATCHED};
use std::collections::BTreeSet;
use std::fmt;

use crate::service::UserLookup;

/// Why access was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DenyReason {
    /// The directory did not report exactly one match.
    NotExactlyOneMatch { summary: String },

    /// The summary claimed one match but no record came back.
    MissingRecord,

    /// The account is in none of the allowed groups.
    NotInAllowedGroup,

    /// One side of the LCC comparison is not a number.
    UnparseableLcc { swiped: String, stored: Option<String> },

    /// The card is older than the one the directory knows about.
    StaleCredential { swiped: Lcc, stored: Lcc },

    /// The directory could not be consulted.
    DirectoryFailure { message: String, connection: bool },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotExactlyOneMatch { summary } => write!(f, "directory reported {summary:?}"),
            Self::MissingRecord => write!(f, "directory returned no record"),
            Self::NotInAllowedGroup => write!(f, "account is not in an allowed group"),
            Self::UnparseableLcc { swiped, stored } => {
                write!(f, "LCC not numeric (swiped {swiped:?}, stored {stored:?})")
            }
            Self::StaleCredential { swiped, stored } => {
                write!(f, "stale card (swiped LCC {swiped}, stored LCC {stored})")
            }
            Self::DirectoryFailure { message, .. } => write!(f, "directory failure: {message}"),
        }
    }
}

/// Outcome of the policy for one swipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Open the door.
    ///
    /// `newer_lcc` is set when the card is newer than the directory record;
    /// the caller should write it back. The grant does not depend on that
    /// write succeeding.
    Granted { newer_lcc: Option<Lcc> },

    /// Keep the door closed.
    Denied(DenyReason),
}

impl AccessDecision {
    /// `true` for [`AccessDecision::Granted`].
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }
}

/// Group membership rule plus LCC freshness rule.
///
/// # Examples
///
/// ```
/// use gatekeeper_directory::{AccessDecision, AccessPolicy, DirectoryRecord, UserLookup};
///
/// let policy = AccessPolicy::default();
/// let lookup = UserLookup::new(
///     "1 user matched",
///     vec![DirectoryRecord::new("jdoe", Some("00"), ["users"])],
/// );
///
/// assert_eq!(
///     policy.evaluate(&lookup, "00"),
///     AccessDecision::Granted { newer_lcc: None }
/// );
/// assert!(!policy.evaluate(&lookup, "x").is_granted());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    allowed_groups: BTreeSet<String>,
}

impl AccessPolicy {
    /// Policy admitting members of any of `groups`.
    pub fn new(groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            allowed_groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    /// Groups that grant access.
    pub fn allowed_groups(&self) -> &BTreeSet<String> {
        &self.allowed_groups
    }

    /// Decide whether a lookup result admits a card with `swiped_lcc`.
    pub fn evaluate(&self, lookup: &UserLookup, swiped_lcc: &str) -> AccessDecision {
        if lookup.match_summary != ONE_USER_MATCHED {
            return AccessDecision::Denied(DenyReason::NotExactlyOneMatch {
                summary: lookup.match_summary.clone(),
            });
        }

        let Some(record) = lookup.records.first() else {
            return AccessDecision::Denied(DenyReason::MissingRecord);
        };

        if !record
            .groups
            .iter()
            .any(|group| self.allowed_groups.contains(group))
        {
            return AccessDecision::Denied(DenyReason::NotInAllowedGroup);
        }

        let parsed = (
            swiped_lcc.parse::<Lcc>(),
            record.lcc.as_deref().map(str::parse::<Lcc>),
        );
        let (swiped, stored) = match parsed {
            (Ok(swiped), Some(Ok(stored))) => (swiped, stored),
            _ => {
                return AccessDecision::Denied(DenyReason::UnparseableLcc {
                    swiped: swiped_lcc.to_string(),
                    stored: record.lcc.clone(),
                });
            }
        };

        match swiped.cmp(&stored) {
            std::cmp::Ordering::Less => {
                AccessDecision::Denied(DenyReason::StaleCredential { swiped, stored })
            }
            std::cmp::Ordering::Equal => AccessDecision::Granted { newer_lcc: None },
            std::cmp::Ordering::Greater => AccessDecision::Granted {
                newer_lcc: Some(swiped),
            },
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new([DEFAULT_ACCESS_GROUP])
    }
}
