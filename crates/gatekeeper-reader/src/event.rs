//! Reader events and the shared line parser.

use gatekeeper_core::CoreError;
use gatekeeper_core::Swipe;
use gatekeeper_core::constants::SWIPE_SENTINEL;
use std::fmt;

/// One event decoded from the card reader.
///
/// Events arrive in the order the reader produced them. New kinds may be
/// added, so consumers must handle unknown variants.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReaderEvent {
    /// A card was swiped.
    Swipe {
        /// Employee identifier as read from the card.
        raw_id: String,
        /// Last card code as read from the card.
        raw_lcc: String,
    },

    /// A line that is not a usable swipe.
    InvalidData {
        /// The line exactly as received, without its terminator.
        raw: String,
        /// Why extraction failed, when the line looked like a swipe.
        cause: Option<CoreError>,
    },
}

impl ReaderEvent {
    /// Create a swipe event.
    pub fn swipe(raw_id: impl Into<String>, raw_lcc: impl Into<String>) -> Self {
        Self::Swipe {
            raw_id: raw_id.into(),
            raw_lcc: raw_lcc.into(),
        }
    }

    /// Create an invalid data event.
    pub fn invalid(raw: impl Into<String>, cause: Option<CoreError>) -> Self {
        Self::InvalidData {
            raw: raw.into(),
            cause,
        }
    }
}

impl fmt::Display for ReaderEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Swipe { raw_id, raw_lcc } => write!(f, "Swipe(ID: {raw_id} LCC: {raw_lcc})"),
            Self::InvalidData { raw, .. } => write!(f, "InvalidData({raw:?})"),
        }
    }
}

/// Parse one line of reader output.
///
/// Lines starting with `;9` are cut at fixed offsets into a swipe; a line
/// too short to cut becomes [`ReaderEvent::InvalidData`] with a cause. Any
/// other line becomes `InvalidData` without a cause. Never fails.
///
/// # Examples
///
/// ```
/// use gatekeeper_reader::{ReaderEvent, parse_line};
///
/// assert_eq!(
///     parse_line(";912345678009999999"),
///     ReaderEvent::swipe("12345678", "00"),
/// );
/// assert_eq!(parse_line("hello"), ReaderEvent::invalid("hello", None));
/// assert!(matches!(
///     parse_line(";9123"),
///     ReaderEvent::InvalidData { cause: Some(_), .. }
/// ));
/// ```
pub fn parse_line(raw: &str) -> ReaderEvent {
    if !raw.starts_with(SWIPE_SENTINEL) {
        return ReaderEvent::invalid(raw, None);
    }

    match Swipe::extract(raw) {
        Ok(swipe) => ReaderEvent::swipe(swipe.id(), swipe.lcc()),
        Err(cause) => ReaderEvent::invalid(raw, Some(cause)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(";912345678009999999", "12345678", "00")]
    #[case(";91234567803", "12345678", "03")]
    #[case(";900000001991234567890?", "00000001", "99")]
    fn test_parse_swipe(#[case] line: &str, #[case] id: &str, #[case] lcc: &str) {
        assert_eq!(parse_line(line), ReaderEvent::swipe(id, lcc));
    }

    #[rstest]
    #[case("")]
    #[case("9;12345678009999")]
    #[case("%B1234^DOE/JOHN?")]
    #[case(" ;912345678009999")]
    fn test_parse_without_sentinel(#[case] line: &str) {
        assert_eq!(parse_line(line), ReaderEvent::invalid(line, None));
    }

    #[rstest]
    #[case(";9")]
    #[case(";91234567")]
    #[case(";9123456780")]
    fn test_parse_short_swipe(#[case] line: &str) {
        match parse_line(line) {
            ReaderEvent::InvalidData { raw, cause } => {
                assert_eq!(raw, line);
                assert!(matches!(cause, Some(CoreError::MalformedSwipe { .. })));
            }
            other => panic!("expected InvalidData, got {other:?}"),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ReaderEvent::swipe("12345678", "00").to_string(),
            "Swipe(ID: 12345678 LCC: 00)"
        );
        assert_eq!(
            ReaderEvent::invalid("junk", None).to_string(),
            "InvalidData(\"junk\")"
        );
    }
}
