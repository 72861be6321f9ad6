//! Mock card reader for testing and development.
//!
//! A [`MockCardReader`] yields whatever its [`MockCardReaderHandle`] feeds
//! it, in order. Dropping every handle ends the stream.

use crate::error::{ReaderError, Result};
use crate::event::{ReaderEvent, parse_line};
use crate::traits::CardReader;
use tokio::sync::mpsc;

/// Card reader driven from a test.
///
/// # Examples
///
/// ```
/// use gatekeeper_reader::mock::MockCardReader;
/// use gatekeeper_reader::{CardReader, ReaderEvent};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> gatekeeper_reader::Result<()> {
///     let (mut reader, handle) = MockCardReader::new();
///     handle.type_line(";912345678009999999");
///     drop(handle);
///
///     assert_eq!(
///         reader.next_event().await?,
///         Some(ReaderEvent::swipe("12345678", "00"))
///     );
///     assert_eq!(reader.next_event().await?, None);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockCardReader {
    rx: mpsc::UnboundedReceiver<Result<ReaderEvent>>,
}

impl MockCardReader {
    /// Create a mock reader and the handle that feeds it.
    pub fn new() -> (Self, MockCardReaderHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, MockCardReaderHandle { tx })
    }
}

impl CardReader for MockCardReader {
    async fn next_event(&mut self) -> Result<Option<ReaderEvent>> {
        self.rx.recv().await.transpose()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Feeds a [`MockCardReader`].
#[derive(Debug, Clone)]
pub struct MockCardReaderHandle {
    tx: mpsc::UnboundedSender<Result<ReaderEvent>>,
}

impl MockCardReaderHandle {
    /// Queue an event.
    pub fn send(&self, event: ReaderEvent) {
        // A dropped reader just means nobody is listening any more.
        let _ = self.tx.send(Ok(event));
    }

    /// Queue the event a physical reader would produce for `line`.
    pub fn type_line(&self, line: &str) {
        self.send(parse_line(line));
    }

    /// Queue an input failure.
    pub fn fail(&self, err: ReaderError) {
        let _ = self.tx.send(Err(err));
    }
}
