//! Error types for card reader operations.
//!
//! Malformed card data is never an error at this level: it surfaces as a
//! [`ReaderEvent::InvalidData`](crate::ReaderEvent::InvalidData) event. The
//! errors here cover reader construction and a broken input source.

use std::path::PathBuf;

/// Result type alias for reader operations.
pub type Result<T> = std::result::Result<T, ReaderError>;

/// Errors that can occur while opening or reading a card reader.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// The reader could not be opened; raised before any event is produced.
    #[error("Could not initialize reader at {}: {message}", path.display())]
    Initialization { path: PathBuf, message: String },

    /// The input source failed mid-stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReaderError {
    /// Create a new initialization error.
    pub fn initialization(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Initialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Map an error from opening the device file to an initialization error.
    pub(crate) fn from_open(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        let message = match err.kind() {
            std::io::ErrorKind::NotFound => "device does not exist".to_string(),
            std::io::ErrorKind::PermissionDenied => {
                "permission denied (is the user in the 'input' group?)".to_string()
            }
            _ => err.to_string(),
        };
        Self::initialization(path, message)
    }

    /// Check if this error happened before the reader produced events.
    pub fn is_initialization(&self) -> bool {
        matches!(self, Self::Initialization { .. })
    }
}
