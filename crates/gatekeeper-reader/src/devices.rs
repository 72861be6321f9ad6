//! Enum wrapper for card reader dispatch.
//!
//! Native `async fn` in traits is not object-safe, so backend selection goes
//! through [`AnyCardReader`] instead of `Box<dyn CardReader>`.

use crate::error::Result;
use crate::event::ReaderEvent;
use crate::line::LineReader;
use crate::raw::RawKeyboardReader;
use crate::traits::CardReader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::io::{BufReader, Stdin};

/// Which input the card reader is consumed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderMode {
    /// Newline-terminated records on standard input.
    #[default]
    Stdin,

    /// `struct input_event` records from an evdev device file.
    Raw,
}

impl fmt::Display for ReaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "stdin"),
            Self::Raw => write!(f, "raw"),
        }
    }
}

/// Card reader selected at startup.
///
/// # Examples
///
/// ```no_run
/// use gatekeeper_reader::{AnyCardReader, CardReader, ReaderMode};
///
/// #[tokio::main]
/// async fn main() -> gatekeeper_reader::Result<()> {
///     let mut reader = AnyCardReader::open(ReaderMode::Stdin, None).await?;
///     println!("reading from {}", reader.name());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyCardReader {
    /// Line-based reader on standard input.
    Stdin(LineReader<BufReader<Stdin>>),

    /// Raw evdev reader.
    RawKeyboard(RawKeyboardReader),
}

impl AnyCardReader {
    /// Open the reader for `mode`.
    ///
    /// `device` is only used in [`ReaderMode::Raw`].
    ///
    /// # Errors
    ///
    /// Returns an initialization error if the raw device is missing, not
    /// configured, or cannot be opened.
    pub async fn open(mode: ReaderMode, device: Option<&Path>) -> Result<Self> {
        match mode {
            ReaderMode::Stdin => Ok(Self::Stdin(LineReader::stdin())),
            ReaderMode::Raw => {
                let device = device.ok_or_else(|| {
                    crate::ReaderError::initialization("<unset>", "raw mode needs a device path")
                })?;
                Ok(Self::RawKeyboard(RawKeyboardReader::open(device).await?))
            }
        }
    }
}

impl CardReader for AnyCardReader {
    async fn next_event(&mut self) -> Result<Option<ReaderEvent>> {
        match self {
            Self::Stdin(reader) => reader.next_event().await,
            Self::RawKeyboard(reader) => reader.next_event().await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Stdin(reader) => reader.name(),
            Self::RawKeyboard(reader) => reader.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_raw_without_device() {
        let err = AnyCardReader::open(ReaderMode::Raw, None).await.unwrap_err();
        assert!(err.is_initialization());
    }

    #[tokio::test]
    async fn test_open_raw_missing_device() {
        let err = AnyCardReader::open(ReaderMode::Raw, Some(Path::new("/nonexistent/event99")))
            .await
            .unwrap_err();
        assert!(err.is_initialization());
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_open_stdin() {
        let reader = AnyCardReader::open(ReaderMode::Stdin, None).await.unwrap();
        assert_eq!(reader.name(), "stdin");
    }

    #[test]
    fn test_reader_mode_display() {
        assert_eq!(ReaderMode::Stdin.to_string(), "stdin");
        assert_eq!(ReaderMode::Raw.to_string(), "raw");
        assert_eq!(ReaderMode::default(), ReaderMode::Stdin);
    }
}
