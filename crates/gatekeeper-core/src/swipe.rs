//! Swipe record extraction.
//!
//! A swipe is reduced to two strings cut out of the reader payload at fixed
//! byte offsets: the employee identifier (`[2, 10)`) and the last card code
//! (`[10, 12)`). Bytes beyond the LCC are ignored.

use crate::constants::{ID_OFFSETS, LCC_OFFSETS, MIN_SWIPE_LEN};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// One physical card read, reduced to identifier and credential version.
///
/// A `Swipe` is immutable once built. Both fields are kept as the raw strings
/// read off the card; numeric interpretation of the LCC happens in the access
/// policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Swipe {
    id: String,
    lcc: String,
}

impl Swipe {
    /// Build a swipe from already extracted fields.
    pub fn new(id: impl Into<String>, lcc: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            lcc: lcc.into(),
        }
    }

    /// Extract identifier and LCC from a raw payload.
    ///
    /// The payload is expected to still carry its two-byte sentinel; offsets
    /// are absolute.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedSwipe`] if the payload is shorter than
    /// [`MIN_SWIPE_LEN`] bytes or the offsets split a multi-byte character.
    ///
    /// # Examples
    ///
    /// ```
    /// use gatekeeper_core::Swipe;
    ///
    /// let swipe = Swipe::extract(";912345678009999999").unwrap();
    /// assert_eq!(swipe.id(), "12345678");
    /// assert_eq!(swipe.lcc(), "00");
    ///
    /// assert!(Swipe::extract(";91234").is_err());
    /// ```
    pub fn extract(payload: &str) -> Result<Self> {
        if payload.len() < MIN_SWIPE_LEN {
            return Err(CoreError::malformed_swipe(
                payload.len(),
                format!("expected at least {MIN_SWIPE_LEN} bytes"),
            ));
        }

        let id = payload.get(ID_OFFSETS).ok_or_else(|| {
            CoreError::malformed_swipe(payload.len(), "identifier is not ASCII")
        })?;
        let lcc = payload
            .get(LCC_OFFSETS)
            .ok_or_else(|| CoreError::malformed_swipe(payload.len(), "LCC is not ASCII"))?;

        Ok(Self::new(id, lcc))
    }

    /// Lenient form of [`Swipe::extract`].
    ///
    /// A payload that cannot be cut yields a swipe with both fields empty and
    /// a logged warning instead of an error.
    pub fn from_payload(payload: &str) -> Self {
        Self::extract(payload).unwrap_or_else(|e| {
            warn!("Swipe data was not received in the correct format: {}", e);
            Self::empty()
        })
    }

    /// A swipe with no identifier and no LCC.
    pub fn empty() -> Self {
        Self::new(String::new(), String::new())
    }

    /// Employee identifier as read from the card.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last card code as read from the card.
    pub fn lcc(&self) -> &str {
        &self.lcc
    }

    /// `true` when neither field carries data.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.lcc.is_empty()
    }
}

impl fmt::Display for Swipe {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ID: {} LCC: {}", self.id, self.lcc)
    }
}
