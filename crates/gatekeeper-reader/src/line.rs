//! Line-oriented card reader.
//!
//! The reader in keyboard-emulation mode types each swipe followed by Enter,
//! so when its output is piped to the process (or typed on a console) every
//! newline-terminated record is one event.

use crate::error::Result;
use crate::event::{ReaderEvent, parse_line};
use crate::traits::CardReader;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tracing::{debug, info};

/// Reads card data one line at a time from a buffered text stream.
///
/// Input bytes that are not UTF-8 are replaced rather than rejected, so a
/// garbled line still becomes an [`ReaderEvent::InvalidData`] event.
///
/// # Examples
///
/// ```
/// use gatekeeper_reader::{CardReader, LineReader, ReaderEvent};
///
/// #[tokio::main]
/// async fn main() -> gatekeeper_reader::Result<()> {
///     let input: &[u8] = b";912345678009999999\nnoise\n";
///     let mut reader = LineReader::new(input);
///
///     assert_eq!(
///         reader.next_event().await?,
///         Some(ReaderEvent::swipe("12345678", "00"))
///     );
///     assert_eq!(
///         reader.next_event().await?,
///         Some(ReaderEvent::invalid("noise", None))
///     );
///     assert_eq!(reader.next_event().await?, None);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct LineReader<R> {
    input: R,
    buf: Vec<u8>,
    name: String,
}

impl<R: AsyncBufRead + Unpin + Send> LineReader<R> {
    /// Wrap a buffered input stream.
    pub fn new(input: R) -> Self {
        Self::with_name(input, "line")
    }

    /// Wrap a buffered input stream with a custom name for logs.
    pub fn with_name(input: R, name: impl Into<String>) -> Self {
        Self {
            input,
            buf: Vec::with_capacity(64),
            name: name.into(),
        }
    }
}

impl LineReader<BufReader<Stdin>> {
    /// Read card data from the process's standard input.
    pub fn stdin() -> Self {
        Self::with_name(BufReader::new(tokio::io::stdin()), "stdin")
    }
}

impl<R: AsyncBufRead + Unpin + Send> CardReader for LineReader<R> {
    async fn next_event(&mut self) -> Result<Option<ReaderEvent>> {
        self.buf.clear();
        let read = self.input.read_until(b'\n', &mut self.buf).await?;
        if read == 0 {
            info!("{} closed: leaving reader loop", self.name);
            return Ok(None);
        }

        let line = String::from_utf8_lossy(strip_terminator(&self.buf));
        debug!("Reader line: {:?}", line);
        Ok(Some(parse_line(&line)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Drop a trailing `\n` or `\r\n`.
fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(input: &[u8]) -> Vec<ReaderEvent> {
        let mut reader = LineReader::new(input);
        let mut events = Vec::new();
        while let Some(event) = reader.next_event().await.unwrap() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_line_reader_sequence() {
        let events = collect(b";912345678009999999\n;9123\nhello\n").await;

        assert_eq!(events.len(), 3);
        assert_eq!(events[0], ReaderEvent::swipe("12345678", "00"));
        assert!(matches!(
            &events[1],
            ReaderEvent::InvalidData { raw, cause: Some(_) } if raw == ";9123"
        ));
        assert_eq!(events[2], ReaderEvent::invalid("hello", None));
    }

    #[tokio::test]
    async fn test_line_reader_last_line_without_newline() {
        let events = collect(b";98765432105").await;
        assert_eq!(events, vec![ReaderEvent::swipe("87654321", "05")]);
    }

    #[tokio::test]
    async fn test_line_reader_crlf() {
        let events = collect(b"noise\r\n").await;
        assert_eq!(events, vec![ReaderEvent::invalid("noise", None)]);
    }

    #[tokio::test]
    async fn test_line_reader_empty_line() {
        let events = collect(b"\n").await;
        assert_eq!(events, vec![ReaderEvent::invalid("", None)]);
    }

    #[tokio::test]
    async fn test_line_reader_invalid_utf8() {
        let events = collect(b"\xff\xfe\n").await;
        assert!(matches!(&events[0], ReaderEvent::InvalidData { cause: None, .. }));
    }

    #[tokio::test]
    async fn test_line_reader_end_of_input() {
        let mut reader = LineReader::new(&b""[..]);
        assert_eq!(reader.next_event().await.unwrap(), None);
        // Stays ended
        assert_eq!(reader.next_event().await.unwrap(), None);
    }

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator(b"abc\n"), b"abc");
        assert_eq!(strip_terminator(b"abc\r\n"), b"abc");
        assert_eq!(strip_terminator(b"abc"), b"abc");
    }
}
