//! Enum wrapper for strike backend dispatch.
//!
//! The backend is chosen once at startup and never changes. Native `async
//! fn` in traits is not object-safe, so selection goes through
//! [`AnyStrike`] instead of `Box<dyn StrikeDevice>`.

use crate::error::Result;
use crate::fake::FakeStrike;
use crate::gpio::GpioStrike;
use crate::serial::{SerialStrike, SystemPorts};
use crate::traits::StrikeDevice;
use gatekeeper_core::constants::{CONTROLLER_SETTLE_MS, DEFAULT_STRIKE_DWELL_MS, DEFAULT_STRIKE_PIN};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::info;

/// Configured strike backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrikeMethod {
    /// Log only.
    #[default]
    Fake,

    /// Serial strike controller.
    #[serde(alias = "arduino")]
    Serial,

    /// GPIO line on the host.
    #[serde(alias = "pi")]
    Gpio,
}

impl fmt::Display for StrikeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fake => write!(f, "fake"),
            Self::Serial => write!(f, "serial"),
            Self::Gpio => write!(f, "gpio"),
        }
    }
}

/// Backend settings beyond the method itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrikeSettings {
    /// GPIO line used by [`StrikeMethod::Gpio`].
    pub gpio_pin: u32,

    /// How long the GPIO line is held high.
    pub dwell: Duration,
}

impl Default for StrikeSettings {
    fn default() -> Self {
        Self {
            gpio_pin: DEFAULT_STRIKE_PIN,
            dwell: Duration::from_millis(DEFAULT_STRIKE_DWELL_MS),
        }
    }
}

/// Strike backend selected at startup.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyStrike {
    /// Log-only strike.
    Fake(FakeStrike),

    /// GPIO-driven strike.
    Gpio(GpioStrike),

    /// Serial controller strike.
    Serial(SerialStrike<SystemPorts>),
}

impl AnyStrike {
    /// Build the backend for `method`.
    ///
    /// # Errors
    ///
    /// Returns an error if the GPIO line cannot be configured or the serial
    /// port scan task dies. A missing serial controller is not an error; that
    /// backend starts undiscovered.
    pub async fn open(method: StrikeMethod, settings: &StrikeSettings) -> Result<Self> {
        let strike = match method {
            StrikeMethod::Fake => Self::Fake(FakeStrike),
            StrikeMethod::Gpio => {
                Self::Gpio(GpioStrike::open(settings.gpio_pin, settings.dwell).await?)
            }
            StrikeMethod::Serial => Self::Serial(
                SerialStrike::spawn_discover(
                    SystemPorts::default(),
                    Duration::from_millis(CONTROLLER_SETTLE_MS),
                )
                .await?,
            ),
        };

        info!("Using {} strike", strike.name());
        Ok(strike)
    }
}

impl StrikeDevice for AnyStrike {
    async fn strike(&mut self) {
        match self {
            Self::Fake(strike) => strike.strike().await,
            Self::Gpio(strike) => strike.strike().await,
            Self::Serial(strike) => strike.strike().await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Fake(strike) => strike.name(),
            Self::Gpio(strike) => strike.name(),
            Self::Serial(strike) => strike.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_deserialize_aliases() {
        let method: StrikeMethod = serde_json::from_str("\"arduino\"").unwrap();
        assert_eq!(method, StrikeMethod::Serial);
        let method: StrikeMethod = serde_json::from_str("\"pi\"").unwrap();
        assert_eq!(method, StrikeMethod::Gpio);
    }

    #[test]
    fn test_default_settings() {
        let settings = StrikeSettings::default();
        assert_eq!(settings.gpio_pin, 17);
        assert_eq!(settings.dwell, Duration::from_secs(5));
        assert_eq!(StrikeMethod::default(), StrikeMethod::Fake);
    }

    #[tokio::test]
    async fn test_open_fake() {
        let mut strike = AnyStrike::open(StrikeMethod::Fake, &StrikeSettings::default())
            .await
            .unwrap();
        assert_eq!(strike.name(), "fake");
        strike.strike().await;
    }
}
