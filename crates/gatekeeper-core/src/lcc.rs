//! Last card code (LCC) values.
//!
//! Every card carries a small revision counter. Re-issuing a card bumps the
//! counter and the directory remembers the newest revision it has seen, so a
//! lost card with an older LCC stops opening the door.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Credential revision counter.
///
/// Parsing accepts surrounding whitespace, a sign, and leading zeros (`"03"`
/// is 3). Anything that is not an integer is rejected; the access policy
/// treats that as a denial. Directory records may hold negative values, which
/// compare below every issued card.
///
/// # Examples
///
/// ```
/// use gatekeeper_core::Lcc;
///
/// let swiped: Lcc = "05".parse().unwrap();
/// let stored: Lcc = "3".parse().unwrap();
/// assert!(swiped > stored);
/// assert!("x1".parse::<Lcc>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Lcc(i64);

impl Lcc {
    /// Create an LCC from its numeric value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Numeric value of the counter.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Format as the two-digit form written on cards and in the directory.
    #[must_use]
    pub fn to_string_padded(&self) -> String {
        format!("{:02}", self.0)
    }
}

impl fmt::Display for Lcc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Lcc {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(Lcc)
            .map_err(|_| CoreError::invalid_lcc(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("00", 0)]
    #[case("03", 3)]
    #[case("42", 42)]
    #[case(" 7 ", 7)]
    #[case("7", 7)]
    #[case("-1", -1)]
    #[case("+4", 4)]
    fn test_lcc_valid(#[case] input: &str, #[case] expected: i64) {
        let lcc: Lcc = input.parse().unwrap();
        assert_eq!(lcc.value(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("ab")]
    #[case("1a")]
    #[case("4.0")]
    #[case("- 1")]
    #[case("99999999999999999999")]
    fn test_lcc_invalid(#[case] input: &str) {
        let result: Result<Lcc> = input.parse();
        assert!(matches!(result, Err(CoreError::InvalidLcc { .. })));
    }

    #[test]
    fn test_lcc_ordering() {
        assert!(Lcc::new(0) < Lcc::new(3));
        assert!(Lcc::new(-1) < Lcc::new(0));
        assert_eq!("05".parse::<Lcc>().unwrap(), Lcc::new(5));
    }

    #[test]
    fn test_lcc_padded() {
        assert_eq!(Lcc::new(3).to_string_padded(), "03");
        assert_eq!(Lcc::new(12).to_string_padded(), "12");
        assert_eq!(Lcc::new(3).to_string(), "3");
    }

    #[test]
    fn test_lcc_serialization() {
        let json = serde_json::to_string(&Lcc::new(9)).unwrap();
        let back: Lcc = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Lcc::new(9));
    }
}
