//! Log-only strike for bench setups.

use crate::traits::StrikeDevice;
use tracing::info;

/// Strike that only writes a log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeStrike;

impl StrikeDevice for FakeStrike {
    async fn strike(&mut self) {
        info!("Fake strike activated!");
    }

    fn name(&self) -> &str {
        "fake"
    }
}
