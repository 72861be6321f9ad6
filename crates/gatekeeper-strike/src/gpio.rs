//! GPIO-driven door strike.
//!
//! The strike relay hangs off one output line. Firing holds the line high
//! for the dwell time, then drives it low again.
//!
//! Pin access goes through the Linux sysfs interface:
//!
//! ```text
//! /sys/class/gpio/export            <- "17"
//! /sys/class/gpio/gpio17/direction  <- "out"
//! /sys/class/gpio/gpio17/value      <- "1" / "0"
//! ```

#![allow(async_fn_in_trait)]

use crate::error::{Result, StrikeError};
use crate::traits::StrikeDevice;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

/// Default sysfs GPIO root.
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// A single digital output line.
pub trait OutputPin: Send {
    /// Drive the line high.
    async fn set_high(&mut self) -> Result<()>;

    /// Drive the line low.
    async fn set_low(&mut self) -> Result<()>;

    /// Line number, for logs.
    fn number(&self) -> u32;
}

/// Output line exported through sysfs.
#[derive(Debug)]
pub struct SysfsPin {
    number: u32,
    value_path: PathBuf,
}

impl SysfsPin {
    /// Export `number` under [`SYSFS_GPIO_ROOT`] and configure it as an output.
    ///
    /// # Errors
    ///
    /// Returns a GPIO error if the line cannot be exported or configured.
    pub async fn export(number: u32) -> Result<Self> {
        Self::export_at(Path::new(SYSFS_GPIO_ROOT), number).await
    }

    /// Same as [`SysfsPin::export`] with a custom sysfs root.
    ///
    /// A line that is already exported is reused. The line starts low.
    ///
    /// # Errors
    ///
    /// Returns a GPIO error if the line cannot be exported or configured.
    pub async fn export_at(root: &Path, number: u32) -> Result<Self> {
        let line_dir = root.join(format!("gpio{number}"));

        if !tokio::fs::try_exists(&line_dir).await.unwrap_or(false) {
            debug!("Exporting GPIO {}", number);
            tokio::fs::write(root.join("export"), number.to_string())
                .await
                .map_err(|e| StrikeError::gpio(number, format!("export failed: {e}")))?;
        }

        tokio::fs::write(line_dir.join("direction"), "out")
            .await
            .map_err(|e| StrikeError::gpio(number, format!("cannot set direction: {e}")))?;

        let mut pin = Self {
            number,
            value_path: line_dir.join("value"),
        };
        pin.set_low().await?;

        info!("GPIO {} configured as output", number);
        Ok(pin)
    }

    async fn write_value(&self, value: &str) -> Result<()> {
        tokio::fs::write(&self.value_path, value)
            .await
            .map_err(|e| StrikeError::gpio(self.number, format!("cannot write value: {e}")))
    }
}

impl OutputPin for SysfsPin {
    async fn set_high(&mut self) -> Result<()> {
        self.write_value("1").await
    }

    async fn set_low(&mut self) -> Result<()> {
        self.write_value("0").await
    }

    fn number(&self) -> u32 {
        self.number
    }
}

/// Strike that pulses one GPIO line.
///
/// # Examples
///
/// ```no_run
/// use gatekeeper_strike::{GpioStrike, StrikeDevice};
/// use std::time::Duration;
///
/// # async fn example() -> gatekeeper_strike::Result<()> {
/// let mut strike = GpioStrike::open(17, Duration::from_secs(5)).await?;
/// strike.strike().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GpioStrike<P = SysfsPin> {
    pin: P,
    dwell: Duration,
    name: String,
}

impl GpioStrike<SysfsPin> {
    /// Export `number` through sysfs.
    ///
    /// # Errors
    ///
    /// Returns a GPIO error if the line cannot be configured. There is no
    /// fallback to another backend.
    pub async fn open(number: u32, dwell: Duration) -> Result<Self> {
        let pin = SysfsPin::export(number).await?;
        Ok(Self::new(pin, dwell))
    }
}

impl<P: OutputPin> GpioStrike<P> {
    /// Wrap an already configured output line.
    pub fn new(pin: P, dwell: Duration) -> Self {
        let name = format!("gpio{}", pin.number());
        Self { pin, dwell, name }
    }

    /// How long the line is held high per strike.
    pub fn dwell(&self) -> Duration {
        self.dwell
    }

    /// The underlying output line.
    pub fn pin(&self) -> &P {
        &self.pin
    }
}

impl<P: OutputPin> StrikeDevice for GpioStrike<P> {
    async fn strike(&mut self) {
        if let Err(e) = self.pin.set_high().await {
            error!("Strike not sent on GPIO {}: {}", self.pin.number(), e);
            return;
        }
        debug!("GPIO {} high for {:?}", self.pin.number(), self.dwell);

        tokio::time::sleep(self.dwell).await;

        // The relay must not stay energized.
        if let Err(e) = self.pin.set_low().await {
            error!("Could not release GPIO {}: {}", self.pin.number(), e);
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
