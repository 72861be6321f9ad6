//! Error types for strike actuator operations.
//!
//! Only construction can fail the caller. Once a strike device exists,
//! [`StrikeDevice::strike`](crate::StrikeDevice::strike) logs its own
//! failures and returns nothing.

/// Result type alias for strike operations.
pub type Result<T> = std::result::Result<T, StrikeError>;

/// Errors raised by strike backends.
#[derive(Debug, thiserror::Error)]
pub enum StrikeError {
    /// A GPIO line could not be exported, configured, or driven.
    #[error("GPIO {pin}: {message}")]
    Gpio { pin: u32, message: String },

    /// A serial port could not be listed, opened, or written.
    #[error("Serial port {port}: {message}")]
    Serial { port: String, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StrikeError {
    /// Create a new GPIO error.
    pub fn gpio(pin: u32, message: impl Into<String>) -> Self {
        Self::Gpio {
            pin,
            message: message.into(),
        }
    }

    /// Create a new serial error.
    pub fn serial(port: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serial {
            port: port.into(),
            message: message.into(),
        }
    }
}

impl From<serialport::Error> for StrikeError {
    fn from(err: serialport::Error) -> Self {
        Self::serial("<unknown>", err.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            StrikeError::gpio(17, "permission denied").to_string(),
            "GPIO 17: permission denied"
        );
        assert_eq!(
            StrikeError::serial("/dev/ttyACM0", "busy").to_string(),
            "Serial port /dev/ttyACM0: busy"
        );
    }
}
