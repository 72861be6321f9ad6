use thiserror::Error;

/// Errors raised while interpreting swipe payloads and credential values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The payload does not cover the fixed identifier/LCC offsets.
    #[error("Malformed swipe payload ({len} bytes): {message}")]
    MalformedSwipe { len: usize, message: String },

    /// An LCC string that is not a non-negative integer.
    #[error("Invalid LCC value: {value:?}")]
    InvalidLcc { value: String },
}

impl CoreError {
    /// Create a new malformed swipe error.
    pub fn malformed_swipe(len: usize, message: impl Into<String>) -> Self {
        Self::MalformedSwipe {
            len,
            message: message.into(),
        }
    }

    /// Create a new invalid LCC error.
    pub fn invalid_lcc(value: impl Into<String>) -> Self {
        Self::InvalidLcc {
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
