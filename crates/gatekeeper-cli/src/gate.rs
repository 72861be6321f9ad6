//! The dispatch loop.
//!
//! [`Gate`] pulls one event at a time from the card reader and runs it to
//! completion before reading the next:
//!
//! ```text
//! Swipe        -> resolve account -> grant: log + strike
//!                                  -> deny:  log raw id/lcc
//! InvalidData  -> warn, continue
//! anything else -> warn, continue
//! ```
//!
//! A lookup that fails because the directory connection broke gets exactly
//! one reconnect and one retry. Nothing a single swipe does can stop the
//! loop; only the end of the input, an input failure, or the shutdown
//! signal do.

use gatekeeper_core::Swipe;
use gatekeeper_directory::{Account, AccountResolver, DirectoryService};
use gatekeeper_reader::{CardReader, ReaderEvent};
use gatekeeper_strike::StrikeDevice;
use std::fmt;
use std::future::Future;
use tracing::{error, info, warn};

/// What the gate did with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// The door was opened.
    Granted { net_id: String },

    /// Access was refused for the swiped card.
    Denied { id: String, lcc: String },

    /// The event was not a usable swipe.
    Ignored,
}

/// Counters for one run of the gate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GateStats {
    pub events: u64,
    pub granted: u64,
    pub denied: u64,
    pub invalid: u64,
    pub reconnects: u64,
}

impl fmt::Display for GateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} events: {} granted, {} denied, {} invalid, {} reconnects",
            self.events, self.granted, self.denied, self.invalid, self.reconnects
        )
    }
}

/// Card reader, directory and strike wired together.
///
/// # Examples
///
/// ```
/// use gatekeeper_cli::gate::{Gate, GateOutcome};
/// use gatekeeper_directory::mock::MockDirectory;
/// use gatekeeper_directory::{AccessPolicy, AccountResolver};
/// use gatekeeper_reader::mock::MockCardReader;
/// use gatekeeper_reader::parse_line;
/// use gatekeeper_strike::mock::MockStrike;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let (reader, _input) = MockCardReader::new();
///     let (directory, users) = MockDirectory::new();
///     let (strike, door) = MockStrike::new();
///     users.add_user("12345678", "jdoe", "00", ["users"]);
///
///     let resolver = AccountResolver::new(directory, AccessPolicy::default());
///     let mut gate = Gate::new(reader, resolver, strike);
///
///     let outcome = gate.handle_event(parse_line(";912345678009999999")).await;
///     assert_eq!(outcome, GateOutcome::Granted { net_id: "jdoe".into() });
///     assert_eq!(door.strikes(), 1);
/// }
/// ```
#[derive(Debug)]
pub struct Gate<R, D, S> {
    reader: R,
    resolver: AccountResolver<D>,
    strike: S,
    stats: GateStats,
}

impl<R, D, S> Gate<R, D, S>
where
    R: CardReader,
    D: DirectoryService,
    S: StrikeDevice,
{
    /// Wire the three components together.
    pub fn new(reader: R, resolver: AccountResolver<D>, strike: S) -> Self {
        Self {
            reader,
            resolver,
            strike,
            stats: GateStats::default(),
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> GateStats {
        self.stats
    }

    /// Process events until the input ends or `shutdown` resolves.
    ///
    /// An event that is already being handled always runs to completion;
    /// only a pending read is abandoned on shutdown.
    ///
    /// # Errors
    ///
    /// Returns the reader's error if the input source fails.
    pub async fn run<F>(&mut self, shutdown: F) -> gatekeeper_reader::Result<GateStats>
    where
        F: Future<Output = ()>,
    {
        let mut shutdown = std::pin::pin!(shutdown);
        info!("Reading card swipes from {}", self.reader.name());

        loop {
            let next = tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                next = self.reader.next_event() => next?,
            };

            match next {
                Some(event) => {
                    self.handle_event(event).await;
                }
                None => {
                    info!("Card reader input ended");
                    break;
                }
            }
        }

        info!("Gate summary: {}", self.stats);
        Ok(self.stats)
    }

    /// Process one event.
    pub async fn handle_event(&mut self, event: ReaderEvent) -> GateOutcome {
        self.stats.events += 1;

        match event {
            ReaderEvent::Swipe { raw_id, raw_lcc } => {
                let swipe = Swipe::new(raw_id, raw_lcc);
                self.handle_swipe(&swipe).await
            }
            ReaderEvent::InvalidData { raw, cause } => {
                self.stats.invalid += 1;
                match cause {
                    Some(cause) => warn!("Invalid data received: {:?} ({})", raw, cause),
                    None => warn!("Invalid data received: {:?}", raw),
                }
                GateOutcome::Ignored
            }
            other => {
                warn!("Unimplemented reader event: {}", other);
                GateOutcome::Ignored
            }
        }
    }

    async fn handle_swipe(&mut self, swipe: &Swipe) -> GateOutcome {
        let account = self.authorize(swipe).await;

        match account.net_id {
            Some(net_id) if account.decision.is_granted() => {
                info!("Access granted to {}", net_id);
                self.strike.strike().await;
                self.stats.granted += 1;
                GateOutcome::Granted { net_id }
            }
            _ => {
                info!("Denied access to {}", swipe);
                self.stats.denied += 1;
                GateOutcome::Denied {
                    id: swipe.id().to_string(),
                    lcc: swipe.lcc().to_string(),
                }
            }
        }
    }

    /// Resolve the swipe, reconnecting and retrying once on connection loss.
    async fn authorize(&mut self, swipe: &Swipe) -> Account {
        let account = self.resolver.resolve(swipe).await;
        if !account.lost_connection() {
            return account;
        }

        error!(severity = "critical", "Lost connection to the directory");
        self.stats.reconnects += 1;
        if let Err(e) = self.resolver.reconnect().await {
            error!(
                severity = "critical",
                "Could not reconnect to the directory: {}", e
            );
            return account;
        }

        let retried = self.resolver.resolve(swipe).await;
        if retried.lost_connection() {
            error!(
                "Directory still unreachable after reconnect; denying {}",
                swipe
            );
        }
        retried
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_display() {
        let stats = GateStats {
            events: 5,
            granted: 2,
            denied: 1,
            invalid: 2,
            reconnects: 0,
        };
        assert_eq!(
            stats.to_string(),
            "5 events: 2 granted, 1 denied, 2 invalid, 0 reconnects"
        );
    }
}
