//! Mock directory for testing and development.
//!
//! [`MockDirectory`] serves lookups from an in-memory table and records every
//! write and reconnect. The paired [`MockDirectoryHandle`] edits the table and
//! injects failures while the directory is owned by a resolver.

use crate::error::{DirectoryError, Result};
use crate::service::{DirectoryRecord, DirectoryService, UserLookup};
use gatekeeper_core::constants::ONE_USER_MATCHED;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MockState {
    lookups: HashMap<String, UserLookup>,
    lookup_failures: VecDeque<DirectoryError>,
    fail_updates: bool,
    reconnect_failures: VecDeque<DirectoryError>,
    lookup_count: usize,
    update_attempts: usize,
    updates: Vec<(String, String)>,
    reconnect_count: usize,
}

/// In-memory directory.
///
/// # Examples
///
/// ```
/// use gatekeeper_directory::DirectoryService;
/// use gatekeeper_directory::mock::MockDirectory;
///
/// #[tokio::main]
/// async fn main() -> gatekeeper_directory::Result<()> {
///     let (directory, handle) = MockDirectory::new();
///     handle.add_user("12345678", "jdoe", "00", ["users"]);
///
///     let lookup = directory.find_by_employee_id("12345678").await?;
///     assert_eq!(lookup.match_summary, "1 user matched");
///     assert_eq!(lookup.records[0].net_id, "jdoe");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockDirectory {
    state: Arc<Mutex<MockState>>,
}

impl MockDirectory {
    /// Create an empty mock directory and its control handle.
    pub fn new() -> (Self, MockDirectoryHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockDirectoryHandle { state },
        )
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DirectoryService for MockDirectory {
    async fn find_by_employee_id(&self, employee_id: &str) -> Result<UserLookup> {
        let mut state = self.state();
        state.lookup_count += 1;

        if let Some(err) = state.lookup_failures.pop_front() {
            return Err(err);
        }

        Ok(state
            .lookups
            .get(employee_id)
            .cloned()
            .unwrap_or_else(|| UserLookup::new("0 users matched", Vec::new())))
    }

    async fn update_lcc(&self, net_id: &str, lcc: &str) -> Result<()> {
        let mut state = self.state();
        state.update_attempts += 1;

        if state.fail_updates {
            return Err(DirectoryError::rpc(2100, "ACIError", "insufficient access"));
        }

        state.updates.push((net_id.to_string(), lcc.to_string()));
        for lookup in state.lookups.values_mut() {
            for record in lookup.records.iter_mut().filter(|r| r.net_id == net_id) {
                record.lcc = Some(lcc.to_string());
            }
        }
        Ok(())
    }

    async fn reconnect(&mut self) -> Result<()> {
        let mut state = self.state();
        state.reconnect_count += 1;

        match state.reconnect_failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Handle for controlling a [`MockDirectory`].
#[derive(Debug, Clone)]
pub struct MockDirectoryHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockDirectoryHandle {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a single-match account for an employee number.
    pub fn add_user(
        &self,
        employee_id: &str,
        net_id: &str,
        lcc: &str,
        groups: impl IntoIterator<Item = impl Into<String>>,
    ) {
        let record = DirectoryRecord::new(net_id, Some(lcc), groups);
        self.set_lookup(employee_id, UserLookup::new(ONE_USER_MATCHED, vec![record]));
    }

    /// Set the exact lookup result returned for an employee number.
    pub fn set_lookup(&self, employee_id: &str, lookup: UserLookup) {
        self.state().lookups.insert(employee_id.to_string(), lookup);
    }

    /// Make the next lookup fail with `err`. Failures queue up.
    pub fn fail_next_lookup(&self, err: DirectoryError) {
        self.state().lookup_failures.push_back(err);
    }

    /// Make the next reconnect fail with `err`. Failures queue up.
    pub fn fail_next_reconnect(&self, err: DirectoryError) {
        self.state().reconnect_failures.push_back(err);
    }

    /// Make every LCC write fail (or succeed again).
    pub fn fail_updates(&self, fail: bool) {
        self.state().fail_updates = fail;
    }

    /// Successful writes, as `(net_id, lcc)` pairs.
    pub fn updates(&self) -> Vec<(String, String)> {
        self.state().updates.clone()
    }

    /// Number of write attempts, including failed ones.
    pub fn update_attempts(&self) -> usize {
        self.state().update_attempts
    }

    /// Number of lookups served or failed.
    pub fn lookup_count(&self) -> usize {
        self.state().lookup_count
    }

    /// Number of reconnects requested.
    pub fn reconnect_count(&self) -> usize {
        self.state().reconnect_count
    }
}
