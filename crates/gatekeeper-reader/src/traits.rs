//! Card reader trait definition.
//!
//! Uses native `async fn` in traits (Edition 2024 RPITIT). The trait is not
//! object-safe; use generics or the [`AnyCardReader`](crate::devices::AnyCardReader)
//! enum for backend selection.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::event::ReaderEvent;

/// A source of decoded card reader events.
///
/// The stream is forward-only and cannot be restarted. It mirrors a live
/// hardware feed, so in practice it only ends when the input closes.
///
/// # Examples
///
/// ```no_run
/// use gatekeeper_reader::{CardReader, ReaderEvent, Result};
///
/// async fn count_swipes<R: CardReader>(reader: &mut R) -> Result<usize> {
///     let mut swipes = 0;
///     while let Some(event) = reader.next_event().await? {
///         if matches!(event, ReaderEvent::Swipe { .. }) {
///             swipes += 1;
///         }
///     }
///     Ok(swipes)
/// }
/// ```
pub trait CardReader: Send {
    /// Wait for the next event.
    ///
    /// Returns `Ok(None)` once the input has ended.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying input source fails. Malformed card
    /// data is reported as [`ReaderEvent::InvalidData`], not as an error.
    async fn next_event(&mut self) -> Result<Option<ReaderEvent>>;

    /// Short human-readable name of the backend, for logs.
    fn name(&self) -> &str;
}
