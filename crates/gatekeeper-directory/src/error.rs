//! Error types for directory service operations.

/// Result type alias for directory operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Errors that can occur while talking to the directory service.
///
/// Callers branch on [`DirectoryError::is_connection_failure`]: a broken or
/// expired connection is worth one reconnect, anything else is a definitive
/// answer for this request.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The directory could not be reached or the request did not complete.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The session cookie was rejected; a new login is required.
    #[error("Session expired")]
    SessionExpired,

    /// Login was refused.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The directory answered with a JSON-RPC error object.
    #[error("Directory error {code} ({name}): {message}")]
    Rpc {
        code: i64,
        name: String,
        message: String,
    },

    /// The response could not be understood.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// Client setup failed.
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DirectoryError {
    /// Create a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a new JSON-RPC error.
    pub fn rpc(code: i64, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// `true` if the connection itself is at fault and a reconnect may help.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::SessionExpired)
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::invalid_response(err.to_string())
        } else if err.is_builder() {
            Self::configuration(err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_response(err.to_string())
    }
}
