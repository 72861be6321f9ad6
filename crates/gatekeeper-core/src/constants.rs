//! Wire-format and policy constants.
//!
//! The ET-MS90 magnetic stripe reader emits one ASCII line per swipe:
//!
//! ```text
//! ;9<id:8 digits><lcc:2 digits><anything>\n
//! ```
//!
//! Only the first [`MIN_SWIPE_LEN`] bytes are load-bearing. Everything after
//! the LCC is track filler and is ignored.
//!
//! ```
//! use gatekeeper_core::constants::*;
//!
//! let line = ";912345678009999999";
//! assert!(line.starts_with(SWIPE_SENTINEL));
//! assert_eq!(&line[ID_OFFSETS], "12345678");
//! assert_eq!(&line[LCC_OFFSETS], "00");
//! ```

use std::ops::Range;

// ============================================================================
// Swipe Payload
// ============================================================================

/// Two-character prefix that marks a card swipe line.
pub const SWIPE_SENTINEL: &str = ";9";

/// Byte offsets of the employee identifier inside a swipe payload.
pub const ID_OFFSETS: Range<usize> = 2..10;

/// Byte offsets of the last card code inside a swipe payload.
pub const LCC_OFFSETS: Range<usize> = 10..12;

/// Expected identifier width in characters.
pub const ID_LEN: usize = ID_OFFSETS.end - ID_OFFSETS.start;

/// Expected LCC width in characters.
pub const LCC_LEN: usize = LCC_OFFSETS.end - LCC_OFFSETS.start;

/// Shortest payload that still carries both identifier and LCC.
pub const MIN_SWIPE_LEN: usize = LCC_OFFSETS.end;

// ============================================================================
// Access Policy
// ============================================================================

/// Summary string the directory reports when exactly one account matched.
pub const ONE_USER_MATCHED: &str = "1 user matched";

/// Group an account must belong to when no other groups are configured.
pub const DEFAULT_ACCESS_GROUP: &str = "users";

// ============================================================================
// Strike Controller
// ============================================================================

/// Byte written to a candidate serial port during discovery.
pub const CONTROLLER_QUERY: u8 = b'Q';

/// Line the strike controller answers the query with.
pub const CONTROLLER_HANDSHAKE: &str = "Arduino_Online";

/// Byte that makes the controller fire the door strike.
pub const CONTROLLER_STRIKE: u8 = b'1';

/// Serial baud rate of the strike controller.
pub const CONTROLLER_BAUD_RATE: u32 = 9600;

/// Read timeout while waiting for the handshake line (milliseconds).
pub const CONTROLLER_READ_TIMEOUT_MS: u64 = 1000;

/// Delay after opening a port before querying it (milliseconds).
///
/// Opening the port resets the controller board.
pub const CONTROLLER_SETTLE_MS: u64 = 2000;

/// How long the GPIO strike pin is held high (milliseconds).
pub const DEFAULT_STRIKE_DWELL_MS: u64 = 5000;

/// GPIO line driven by default when none is configured.
pub const DEFAULT_STRIKE_PIN: u32 = 17;
