//! Binary `struct input_event` records read from `/dev/input/event*`.
//!
//! ```text
//! struct input_event {
//!     struct timeval time;  // two C longs: seconds, microseconds
//!     __u16 type;
//!     __u16 code;
//!     __s32 value;
//! };
//! ```
//!
//! Records are in host byte order. On 64-bit Linux a record is 24 bytes.

use bytes::{Buf, BufMut, BytesMut};
use chrono::{DateTime, Utc};
use std::ffi::c_long;
use std::mem::size_of;

/// Size of one timestamp field (a C `long`).
const WORD_SIZE: usize = size_of::<c_long>();

/// Size of one encoded input event record.
pub const INPUT_EVENT_SIZE: usize = 2 * WORD_SIZE + 2 + 2 + 4;

/// `EV_KEY` event type.
pub const EV_KEY: u16 = 0x01;

/// Key event value for a key press (0 is release, 2 is autorepeat).
pub const KEY_PRESSED: i32 = 1;

/// One decoded input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    /// Kernel timestamp, if representable.
    pub time: Option<DateTime<Utc>>,

    /// Event type (`EV_KEY`, `EV_MSC`, `EV_SYN`, ...).
    pub kind: u16,

    /// Event code; the keycode for `EV_KEY`.
    pub code: u16,

    /// Event value; press/release/repeat for `EV_KEY`.
    pub value: i32,
}

impl InputEvent {
    /// Create a key event with no timestamp.
    pub fn key(code: u16, value: i32) -> Self {
        Self {
            time: None,
            kind: EV_KEY,
            code,
            value,
        }
    }

    /// Decode one record.
    pub fn decode(record: &[u8; INPUT_EVENT_SIZE]) -> Self {
        let mut buf = &record[..];
        let secs = get_word(&mut buf);
        let micros = get_word(&mut buf);
        let kind = buf.get_u16_ne();
        let code = buf.get_u16_ne();
        let value = buf.get_i32_ne();

        let time = u32::try_from(micros)
            .ok()
            .and_then(|us| us.checked_mul(1000))
            .and_then(|nanos| DateTime::from_timestamp(secs, nanos));

        Self {
            time,
            kind,
            code,
            value,
        }
    }

    /// Encode as a record in host byte order.
    pub fn encode(&self) -> [u8; INPUT_EVENT_SIZE] {
        let (secs, micros) = self
            .time
            .map(|t| (t.timestamp(), i64::from(t.timestamp_subsec_micros())))
            .unwrap_or((0, 0));

        let mut buf = BytesMut::with_capacity(INPUT_EVENT_SIZE);
        put_word(&mut buf, secs);
        put_word(&mut buf, micros);
        buf.put_u16_ne(self.kind);
        buf.put_u16_ne(self.code);
        buf.put_i32_ne(self.value);

        let mut record = [0u8; INPUT_EVENT_SIZE];
        record.copy_from_slice(&buf);
        record
    }

    /// `true` for an `EV_KEY` press (not release or autorepeat).
    pub fn is_key_press(&self) -> bool {
        self.kind == EV_KEY && self.value == KEY_PRESSED
    }
}

fn get_word(buf: &mut &[u8]) -> i64 {
    if WORD_SIZE == 8 {
        buf.get_i64_ne()
    } else {
        i64::from(buf.get_i32_ne())
    }
}

fn put_word(buf: &mut BytesMut, value: i64) {
    if WORD_SIZE == 8 {
        buf.put_i64_ne(value);
    } else {
        buf.put_i32_ne(narrow_word(value));
    }
}

/// Saturate a time field to the 32-bit `long` of narrow targets.
fn narrow_word(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_size() {
        assert_eq!(INPUT_EVENT_SIZE, 2 * size_of::<c_long>() + 8);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(INPUT_EVENT_SIZE, 24);
    }

    #[test]
    fn test_decode_fields() {
        let time = DateTime::from_timestamp(1_700_000_000, 250_000_000).unwrap();
        let event = InputEvent {
            time: Some(time),
            kind: EV_KEY,
            code: 39,
            value: KEY_PRESSED,
        };

        let decoded = InputEvent::decode(&event.encode());
        assert_eq!(decoded, event);
        assert!(decoded.is_key_press());
    }

    #[test]
    fn test_narrow_word_saturates() {
        assert_eq!(narrow_word(5), 5);
        assert_eq!(narrow_word(-5), -5);
        assert_eq!(narrow_word(i64::from(i32::MAX) + 1), i32::MAX);
        assert_eq!(narrow_word(i64::MAX), i32::MAX);
        assert_eq!(narrow_word(i64::MIN), i32::MIN);
    }

    #[test]
    fn test_key_release_is_not_press() {
        assert!(!InputEvent::key(2, 0).is_key_press());
        assert!(!InputEvent::key(2, 2).is_key_press());
        assert!(InputEvent::key(2, 1).is_key_press());
    }

    #[test]
    fn test_non_key_event_is_not_press() {
        let sync = InputEvent {
            time: None,
            kind: 0x00,
            code: 0,
            value: 1,
        };
        assert!(!sync.is_key_press());
    }
}
