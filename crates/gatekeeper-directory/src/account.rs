//! Account resolution for one swipe.
//!
//! [`AccountResolver::resolve`] is total: whatever happens while talking to
//! the directory, the caller gets a fully formed [`Account`] and only has to
//! look at [`Account::has_access`]. The write-back of a newer card code runs
//! after the decision is fixed and is recorded separately, so it cannot
//! change the outcome.

use crate::error::{DirectoryError, Result};
use crate::policy::{AccessDecision, AccessPolicy, DenyReason};
use crate::service::{DirectoryService, UserLookup};
use gatekeeper_core::{Lcc, Swipe};
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

/// Result of the best-effort LCC write-back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LccUpdate {
    /// The directory accepted the new value.
    Written(Lcc),

    /// The write failed; access was granted anyway.
    Failed { lcc: Lcc, message: String },
}

/// Directory view of the cardholder behind one swipe.
///
/// Built from a single lookup and discarded once the swipe is handled.
/// Nothing is cached between swipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Employee number read from the card.
    pub employee_id: String,

    /// Login name, when exactly one record was resolved.
    pub net_id: Option<String>,

    /// Stored card code, when present and numeric.
    pub lcc: Option<Lcc>,

    /// Group memberships of the resolved record.
    pub groups: BTreeSet<String>,

    /// Directory-reported match cardinality.
    pub match_summary: String,

    /// Policy outcome.
    pub decision: AccessDecision,

    /// Write-back attempt, only for cards newer than the record.
    pub lcc_update: Option<LccUpdate>,
}

impl Account {
    /// `true` if the door should open.
    pub fn has_access(&self) -> bool {
        self.decision.is_granted()
    }

    /// Why access was refused, if it was.
    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match &self.decision {
            AccessDecision::Denied(reason) => Some(reason),
            AccessDecision::Granted { .. } => None,
        }
    }

    /// `true` if the lookup failed because the directory connection broke.
    pub fn lost_connection(&self) -> bool {
        matches!(
            self.deny_reason(),
            Some(DenyReason::DirectoryFailure {
                connection: true,
                ..
            })
        )
    }

    fn unresolved(employee_id: &str, err: &DirectoryError) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            net_id: None,
            lcc: None,
            groups: BTreeSet::new(),
            match_summary: String::new(),
            decision: AccessDecision::Denied(DenyReason::DirectoryFailure {
                message: err.to_string(),
                connection: err.is_connection_failure(),
            }),
            lcc_update: None,
        }
    }

    fn from_lookup(employee_id: &str, lookup: &UserLookup, decision: AccessDecision) -> Self {
        let record = lookup.records.first();
        Self {
            employee_id: employee_id.to_string(),
            net_id: record.map(|r| r.net_id.clone()),
            lcc: record
                .and_then(|r| r.lcc.as_deref())
                .and_then(|lcc| lcc.parse().ok()),
            groups: record
                .map(|r| r.groups.iter().cloned().collect())
                .unwrap_or_default(),
            match_summary: lookup.match_summary.clone(),
            decision,
            lcc_update: None,
        }
    }
}

/// Resolves swipes against the directory and applies the access policy.
///
/// Owns the directory connection for the lifetime of the process.
///
/// # Examples
///
/// ```
/// use gatekeeper_core::Swipe;
/// use gatekeeper_directory::{AccessPolicy, AccountResolver};
/// use gatekeeper_directory::mock::MockDirectory;
///
/// #[tokio::main]
/// async fn main() {
///     let (directory, handle) = MockDirectory::new();
///     handle.add_user("12345678", "jdoe", "00", ["users"]);
///
///     let resolver = AccountResolver::new(directory, AccessPolicy::default());
///     let account = resolver.resolve(&Swipe::new("12345678", "00")).await;
///
///     assert!(account.has_access());
///     assert_eq!(account.net_id.as_deref(), Some("jdoe"));
/// }
/// ```
#[derive(Debug)]
pub struct AccountResolver<D> {
    directory: D,
    policy: AccessPolicy,
}

impl<D: DirectoryService> AccountResolver<D> {
    /// Create a resolver over an already connected directory.
    pub fn new(directory: D, policy: AccessPolicy) -> Self {
        Self { directory, policy }
    }

    /// Resolve one swipe into an account and an access decision.
    ///
    /// Never fails: directory errors become a denial whose reason records
    /// whether the connection was at fault.
    pub async fn resolve(&self, swipe: &Swipe) -> Account {
        let lookup = match self.directory.find_by_employee_id(swipe.id()).await {
            Ok(lookup) => lookup,
            Err(e) => {
                error!("Directory lookup for ID {} failed: {}", swipe.id(), e);
                return Account::unresolved(swipe.id(), &e);
            }
        };

        let decision = self.policy.evaluate(&lookup, swipe.lcc());
        let mut account = Account::from_lookup(swipe.id(), &lookup, decision);

        match &account.decision {
            AccessDecision::Denied(DenyReason::UnparseableLcc { swiped, stored }) => {
                warn!(
                    "LCC string to integer conversion failed (swiped {:?}, stored {:?}); automatically denying access",
                    swiped, stored
                );
            }
            AccessDecision::Denied(reason) => debug!("ID {} denied: {}", swipe.id(), reason),
            AccessDecision::Granted {
                newer_lcc: Some(newer),
            } => {
                let newer = *newer;
                if let Some(net_id) = account.net_id.clone() {
                    account.lcc_update = Some(self.write_back(&net_id, newer).await);
                }
            }
            AccessDecision::Granted { newer_lcc: None } => {}
        }

        account
    }

    /// Replace the directory connection.
    ///
    /// # Errors
    ///
    /// Returns the directory's error if the new connection fails.
    pub async fn reconnect(&mut self) -> Result<()> {
        info!("Restarting connection to the directory");
        self.directory.reconnect().await
    }

    async fn write_back(&self, net_id: &str, lcc: Lcc) -> LccUpdate {
        match self
            .directory
            .update_lcc(net_id, &lcc.to_string_padded())
            .await
        {
            Ok(()) => {
                info!("Updated LCC of {} to {}", net_id, lcc.to_string_padded());
                LccUpdate::Written(lcc)
            }
            Err(e) => {
                warn!("Failed to update LCC of {} to {}: {}", net_id, lcc, e);
                LccUpdate::Failed {
                    lcc,
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDirectory, MockDirectoryHandle};
    use crate::service::DirectoryRecord;

    fn resolver() -> (AccountResolver<MockDirectory>, MockDirectoryHandle) {
        let (directory, handle) = MockDirectory::new();
        (AccountResolver::new(directory, AccessPolicy::default()), handle)
    }

    #[tokio::test]
    async fn test_equal_lcc_grants_without_write() {
        let (resolver, handle) = resolver();
        handle.add_user("12345678", "jdoe", "00", ["users", "ipausers"]);

        let account = resolver.resolve(&Swipe::new("12345678", "00")).await;

        assert!(account.has_access());
        assert_eq!(account.net_id.as_deref(), Some("jdoe"));
        assert_eq!(account.lcc, Some(Lcc::new(0)));
        assert!(account.groups.contains("ipausers"));
        assert_eq!(account.match_summary, "1 user matched");
        assert_eq!(account.lcc_update, None);
        assert!(handle.updates().is_empty());
    }

    #[tokio::test]
    async fn test_newer_lcc_grants_and_writes_once() {
        let (resolver, handle) = resolver();
        handle.add_user("12345678", "jdoe", "00", ["users"]);

        let account = resolver.resolve(&Swipe::new("12345678", "03")).await;

        assert!(account.has_access());
        assert_eq!(account.lcc_update, Some(LccUpdate::Written(Lcc::new(3))));
        assert_eq!(handle.updates(), vec![("jdoe".to_string(), "03".to_string())]);
    }

    #[tokio::test]
    async fn test_negative_stored_lcc_is_older_than_any_card() {
        let (resolver, handle) = resolver();
        handle.add_user("12345678", "jdoe", "-1", ["users"]);

        let account = resolver.resolve(&Swipe::new("12345678", "00")).await;

        assert!(account.has_access());
        assert_eq!(account.lcc, Some(Lcc::new(-1)));
        assert_eq!(handle.updates(), vec![("jdoe".to_string(), "00".to_string())]);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_grant() {
        let (resolver, handle) = resolver();
        handle.add_user("12345678", "jdoe", "00", ["users"]);
        handle.fail_updates(true);

        let account = resolver.resolve(&Swipe::new("12345678", "03")).await;

        assert!(account.has_access());
        assert!(matches!(
            account.lcc_update,
            Some(LccUpdate::Failed { lcc, .. }) if lcc == Lcc::new(3)
        ));
        assert_eq!(handle.update_attempts(), 1);
    }

    #[tokio::test]
    async fn test_stale_lcc_denied_without_write() {
        let (resolver, handle) = resolver();
        handle.add_user("12345678", "jdoe", "05", ["users"]);

        let account = resolver.resolve(&Swipe::new("12345678", "00")).await;

        assert!(!account.has_access());
        assert!(matches!(
            account.deny_reason(),
            Some(DenyReason::StaleCredential { .. })
        ));
        assert_eq!(handle.update_attempts(), 0);
    }

    #[tokio::test]
    async fn test_unknown_employee_denied() {
        let (resolver, _handle) = resolver();

        let account = resolver.resolve(&Swipe::new("99999999", "00")).await;

        assert!(!account.has_access());
        assert_eq!(account.net_id, None);
        assert_eq!(account.match_summary, "0 users matched");
        assert!(!account.lost_connection());
    }

    #[tokio::test]
    async fn test_multiple_matches_denied() {
        let (resolver, handle) = resolver();
        handle.set_lookup(
            "12345678",
            UserLookup::new(
                "2 users matched",
                vec![
                    DirectoryRecord::new("jdoe", Some("00"), ["users"]),
                    DirectoryRecord::new("jroe", Some("00"), ["users"]),
                ],
            ),
        );

        let account = resolver.resolve(&Swipe::new("12345678", "00")).await;
        assert!(!account.has_access());
        assert_eq!(handle.update_attempts(), 0);
    }

    #[tokio::test]
    async fn test_non_numeric_lcc_denied() {
        let (resolver, handle) = resolver();
        handle.add_user("12345678", "jdoe", "0x", ["users"]);

        let account = resolver.resolve(&Swipe::new("12345678", "01")).await;
        assert!(!account.has_access());
        assert_eq!(account.lcc, None);

        let account = resolver.resolve(&Swipe::new("12345678", "?1")).await;
        assert!(!account.has_access());
    }

    #[tokio::test]
    async fn test_transport_failure_is_connection_denial() {
        let (resolver, handle) = resolver();
        handle.add_user("12345678", "jdoe", "00", ["users"]);
        handle.fail_next_lookup(DirectoryError::transport("connection reset"));

        let account = resolver.resolve(&Swipe::new("12345678", "00")).await;
        assert!(!account.has_access());
        assert!(account.lost_connection());

        // Next lookup succeeds
        let account = resolver.resolve(&Swipe::new("12345678", "00")).await;
        assert!(account.has_access());
    }

    #[tokio::test]
    async fn test_rpc_failure_is_not_connection_denial() {
        let (resolver, handle) = resolver();
        handle.fail_next_lookup(DirectoryError::rpc(2100, "ACIError", "insufficient access"));

        let account = resolver.resolve(&Swipe::new("12345678", "00")).await;
        assert!(!account.has_access());
        assert!(!account.lost_connection());
    }

    #[tokio::test]
    async fn test_reconnect_delegates() {
        let (mut resolver, handle) = resolver();
        resolver.reconnect().await.unwrap();
        assert_eq!(handle.reconnect_count(), 1);
    }
}
