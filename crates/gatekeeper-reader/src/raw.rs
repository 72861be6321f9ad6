//! Raw input-device card reader.
//!
//! Reads the reader's keyboard emulation straight from its evdev character
//! device, so the process does not depend on a focused console. Key presses
//! are mapped through [`KEYMAP`](crate::keymap::KEYMAP) into a text buffer;
//! Enter hands the buffer to the shared line parser and starts a new one.

use crate::error::{ReaderError, Result};
use crate::event::{ReaderEvent, parse_line};
use crate::input_event::{INPUT_EVENT_SIZE, InputEvent};
use crate::keymap::{self, KeyLookup};
use crate::traits::CardReader;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{error, info, trace, warn};

/// Characters held without an Enter before the buffer is flushed as invalid.
pub const MAX_PENDING_CHARS: usize = 256;

/// Card reader decoding `struct input_event` records from a device file.
///
/// # Examples
///
/// ```no_run
/// use gatekeeper_reader::{CardReader, RawKeyboardReader};
///
/// #[tokio::main]
/// async fn main() -> gatekeeper_reader::Result<()> {
///     let mut reader = RawKeyboardReader::open("/dev/input/event0").await?;
///     while let Some(event) = reader.next_event().await? {
///         println!("{event}");
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct RawKeyboardReader<S = File> {
    source: S,
    path: PathBuf,
    name: String,
    buffer: String,
}

impl RawKeyboardReader<File> {
    /// Open an input device.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Initialization`] if the device does not exist
    /// or cannot be opened, before any event is read.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).await.map_err(|e| {
            let err = ReaderError::from_open(path, &e);
            error!("{}", err);
            err
        })?;

        info!("Opened raw input device {}", path.display());
        Ok(Self::from_source(file, path))
    }
}

impl<S: AsyncRead + Unpin + Send> RawKeyboardReader<S> {
    /// Decode records from an already opened source.
    pub fn from_source(source: S, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            source,
            path,
            buffer: String::new(),
        }
    }

    /// Device path this reader was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Characters typed since the last Enter.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    async fn read_record(&mut self) -> Result<Option<InputEvent>> {
        let mut record = [0u8; INPUT_EVENT_SIZE];
        match self.source.read_exact(&mut record).await {
            Ok(_) => Ok(Some(InputEvent::decode(&record))),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl<S: AsyncRead + Unpin + Send> CardReader for RawKeyboardReader<S> {
    async fn next_event(&mut self) -> Result<Option<ReaderEvent>> {
        loop {
            let Some(event) = self.read_record().await? else {
                info!("End of input on {}: leaving reader loop", self.name);
                return Ok(None);
            };

            if !event.is_key_press() {
                continue;
            }

            match keymap::lookup(event.code) {
                KeyLookup::Char('\n') => {
                    let line = std::mem::take(&mut self.buffer);
                    trace!("Raw reader line: {:?}", line);
                    return Ok(Some(parse_line(&line)));
                }
                KeyLookup::Char(c) => {
                    self.buffer.push(c);
                    if self.buffer.len() >= MAX_PENDING_CHARS {
                        let line = std::mem::take(&mut self.buffer);
                        warn!(
                            "No Enter after {} characters on {}; discarding them",
                            line.len(),
                            self.name
                        );
                        return Ok(Some(ReaderEvent::invalid(line, None)));
                    }
                }
                KeyLookup::NonPrinting => trace!("Ignoring non-printing keycode {}", event.code),
                KeyLookup::OutOfRange => {
                    warn!(
                        "Keycode {} is outside the {}-entry keymap; dropping it",
                        event.code,
                        keymap::KEYMAP_LEN
                    );
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Keycodes for a string typed on the reader (digits, `;` and Enter only).
    fn keycodes(text: &str) -> Vec<u16> {
        text.chars()
            .map(|c| match c {
                '1'..='9' => c as u16 - '1' as u16 + 2,
                '0' => 11,
                ';' => 39,
                '\n' => 28,
                other => panic!("no keycode for {other:?}"),
            })
            .collect()
    }

    /// Press+release for each key, with a SYN record in between like evdev.
    fn device_bytes(codes: &[u16]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for &code in codes {
            bytes.extend_from_slice(&InputEvent::key(code, 1).encode());
            let syn = InputEvent {
                time: None,
                kind: 0,
                code: 0,
                value: 0,
            };
            bytes.extend_from_slice(&syn.encode());
            bytes.extend_from_slice(&InputEvent::key(code, 0).encode());
        }
        bytes
    }

    #[tokio::test]
    async fn test_raw_reader_decodes_swipe() {
        let bytes = device_bytes(&keycodes(";912345678009999999\n"));
        let mut reader = RawKeyboardReader::from_source(&bytes[..], "/dev/input/test");

        assert_eq!(
            reader.next_event().await.unwrap(),
            Some(ReaderEvent::swipe("12345678", "00"))
        );
        assert_eq!(reader.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_raw_reader_resets_buffer_between_lines() {
        let bytes = device_bytes(&keycodes(";91234567803\n12\n"));
        let mut reader = RawKeyboardReader::from_source(&bytes[..], "test");

        assert_eq!(
            reader.next_event().await.unwrap(),
            Some(ReaderEvent::swipe("12345678", "03"))
        );
        assert_eq!(
            reader.next_event().await.unwrap(),
            Some(ReaderEvent::invalid("12", None))
        );
        assert_eq!(reader.pending(), "");
    }

    #[tokio::test]
    async fn test_raw_reader_drops_out_of_range_keycodes() {
        let mut codes = keycodes(";9123456780");
        codes.push(53); // '/' lies outside the table
        codes.extend(keycodes("1\n"));
        let bytes = device_bytes(&codes);
        let mut reader = RawKeyboardReader::from_source(&bytes[..], "test");

        assert_eq!(
            reader.next_event().await.unwrap(),
            Some(ReaderEvent::swipe("12345678", "01"))
        );
    }

    #[tokio::test]
    async fn test_raw_reader_ignores_shift_and_autorepeat() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&InputEvent::key(42, 1).encode()); // shift
        bytes.extend_from_slice(&InputEvent::key(2, 2).encode()); // autorepeat '1'
        bytes.extend_from_slice(&device_bytes(&keycodes("7\n")));
        let mut reader = RawKeyboardReader::from_source(&bytes[..], "test");

        assert_eq!(
            reader.next_event().await.unwrap(),
            Some(ReaderEvent::invalid("7", None))
        );
    }

    #[tokio::test]
    async fn test_raw_reader_partial_line_at_eof() {
        let bytes = device_bytes(&keycodes(";912"));
        let mut reader = RawKeyboardReader::from_source(&bytes[..], "test");

        assert_eq!(reader.next_event().await.unwrap(), None);
        assert_eq!(reader.pending(), ";912");
    }

    #[tokio::test]
    async fn test_raw_reader_truncated_record_ends_stream() {
        let mut bytes = device_bytes(&keycodes("1\n"));
        bytes.extend_from_slice(&InputEvent::key(2, 1).encode()[..INPUT_EVENT_SIZE / 2]);
        let mut reader = RawKeyboardReader::from_source(&bytes[..], "test");

        assert_eq!(
            reader.next_event().await.unwrap(),
            Some(ReaderEvent::invalid("1", None))
        );
        assert_eq!(reader.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_raw_reader_flushes_runaway_buffer() {
        let mut codes = vec![2u16; 300];
        codes.extend(keycodes(";912345678009999999\n"));
        let bytes = device_bytes(&codes);
        let mut reader = RawKeyboardReader::from_source(&bytes[..], "test");

        match reader.next_event().await.unwrap() {
            Some(ReaderEvent::InvalidData { raw, cause: None }) => {
                assert_eq!(raw.len(), MAX_PENDING_CHARS);
                assert!(raw.chars().all(|c| c == '1'));
            }
            other => panic!("expected InvalidData, got {other:?}"),
        }
        assert_eq!(
            reader.next_event().await.unwrap(),
            Some(ReaderEvent::invalid("1".repeat(300 - MAX_PENDING_CHARS), None))
        );
        assert_eq!(
            reader.next_event().await.unwrap(),
            Some(ReaderEvent::swipe("12345678", "00"))
        );
        assert!(reader.pending().is_empty());
    }

    #[test]
    fn test_keycodes_helper() {
        assert_eq!(keycodes("1;0\n"), vec![2, 39, 11, 28]);
    }
}
