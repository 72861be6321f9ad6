//! Door strike actuators for Gatekeeper.
//!
//! Three backends sit behind [`StrikeDevice`]:
//!
//! - [`FakeStrike`]: logs only; the default.
//! - [`GpioStrike`]: pulses a GPIO line for the dwell time.
//! - [`SerialStrike`]: sends a command byte to a serial controller found by
//!   handshake scanning.
//!
//! Firing a strike never fails from the caller's point of view. Backends log
//! their own faults so a broken actuator cannot take the gate down.

pub mod devices;
pub mod error;
pub mod fake;
pub mod gpio;
pub mod mock;
pub mod serial;
pub mod traits;

pub use devices::{AnyStrike, StrikeMethod, StrikeSettings};
pub use error::{Result, StrikeError};
pub use fake::FakeStrike;
pub use gpio::{GpioStrike, OutputPin, SysfsPin};
pub use serial::{PortEnumerator, SerialLink, SerialStrike, SystemLink, SystemPorts};
pub use traits::StrikeDevice;
