//! Card reader event decoding for Gatekeeper.
//!
//! The door's ET-MS90 magnetic stripe reader behaves like a USB keyboard: each
//! swipe is "typed" as one line of the form
//!
//! ```text
//! ;9<id:8 digits><lcc:2 digits><filler>\n
//! ```
//!
//! This crate turns that input into a forward-only stream of
//! [`ReaderEvent`]s. Two interchangeable backends implement [`CardReader`]:
//!
//! - [`LineReader`]: newline-terminated records from a text stream
//!   (standard input in production).
//! - [`RawKeyboardReader`]: binary `struct input_event` records read from an
//!   evdev device, mapped through a keycode table.
//!
//! A [`mock::MockCardReader`] stands in for both in tests.
//!
//! Both real backends hand each completed line to [`parse_line`], which never fails:
//! anything that is not a usable swipe becomes
//! [`ReaderEvent::InvalidData`].
//!
//! ```
//! use gatekeeper_reader::{CardReader, LineReader, ReaderEvent};
//!
//! #[tokio::main]
//! async fn main() -> gatekeeper_reader::Result<()> {
//!     let mut reader = LineReader::new(&b";912345678039999\n"[..]);
//!     match reader.next_event().await? {
//!         Some(ReaderEvent::Swipe { raw_id, raw_lcc }) => {
//!             assert_eq!((raw_id.as_str(), raw_lcc.as_str()), ("12345678", "03"));
//!         }
//!         other => panic!("unexpected {other:?}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod devices;
pub mod error;
pub mod event;
pub mod input_event;
pub mod keymap;
pub mod line;
pub mod mock;
pub mod raw;
pub mod traits;

pub use devices::{AnyCardReader, ReaderMode};
pub use error::{ReaderError, Result};
pub use event::{ReaderEvent, parse_line};
pub use input_event::InputEvent;
pub use line::LineReader;
pub use raw::RawKeyboardReader;
pub use traits::CardReader;
