//! Process runtime.
//!
//! The gate runs on a runtime built by hand rather than through
//! `#[tokio::main]`, so shutdown can put a deadline on blocking work.

use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// How long blocking tasks get to finish once the gate has stopped.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Drive `future` to completion, then tear the runtime down.
///
/// Blocking tasks still running after [`SHUTDOWN_GRACE`] are abandoned.
///
/// # Errors
///
/// Returns an I/O error if the runtime cannot be built.
pub fn run_to_completion<F: Future>(future: F) -> std::io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let output = runtime.block_on(future);

    // A pending stdin read holds a blocking-pool thread that only returns
    // on the next line.
    debug!("Stopping runtime, grace period {:?}", SHUTDOWN_GRACE);
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    Ok(output)
}
