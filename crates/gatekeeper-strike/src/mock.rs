//! Mock strike device for testing.
//!
//! The [`MockStrike`] counts strikes instead of opening a door. A
//! [`MockStrikeHandle`] observes the count from the test.

use crate::traits::StrikeDevice;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Strike that only counts activations.
///
/// # Examples
///
/// ```
/// use gatekeeper_strike::StrikeDevice;
/// use gatekeeper_strike::mock::MockStrike;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let (mut strike, handle) = MockStrike::new();
///     strike.strike().await;
///     assert_eq!(handle.strikes(), 1);
/// }
/// ```
#[derive(Debug)]
pub struct MockStrike {
    strikes: Arc<AtomicUsize>,
}

impl MockStrike {
    /// Create a mock strike and the handle that observes it.
    pub fn new() -> (Self, MockStrikeHandle) {
        let strikes = Arc::new(AtomicUsize::new(0));
        (
            Self {
                strikes: strikes.clone(),
            },
            MockStrikeHandle { strikes },
        )
    }
}

impl StrikeDevice for MockStrike {
    async fn strike(&mut self) {
        let n = self.strikes.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Mock strike #{}", n);
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Observer for a [`MockStrike`].
#[derive(Debug, Clone)]
pub struct MockStrikeHandle {
    strikes: Arc<AtomicUsize>,
}

impl MockStrikeHandle {
    /// Number of strikes fired so far.
    pub fn strikes(&self) -> usize {
        self.strikes.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_strikes() {
        let (mut strike, handle) = MockStrike::new();
        let observer = handle.clone();
        assert_eq!(handle.strikes(), 0);

        strike.strike().await;
        strike.strike().await;

        assert_eq!(handle.strikes(), 2);
        assert_eq!(observer.strikes(), 2);
        assert_eq!(strike.name(), "mock");
    }
}
