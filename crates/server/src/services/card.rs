//! Card validation.
//!
//! Pure, deterministic checks with no side effects. No real card network is
//! involved: the format rules and the decline rule below are the whole model
//! (see [`PaymentGateway`] for the settlement seam).
//!
//! [`PaymentGateway`]: super::gateway::PaymentGateway

use chrono::{DateTime, Datelike, Utc};
use thiserror::Error;

/// Card numbers ending in these digits are declined (simulated failure mode).
const DECLINE_SUFFIX: &str = "0000";

/// The card field that failed format validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Number,
    Cvv,
    Pin,
}

impl CardField {
    /// User-facing format requirement for this field.
    #[must_use]
    pub const fn requirement(&self) -> &'static str {
        match self {
            Self::Number => "Card number must be 16 digits",
            Self::Cvv => "CVV must be 3 digits",
            Self::Pin => "PIN must be 4 digits",
        }
    }
}

/// Card rejection reasons.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CardError {
    /// A field has the wrong length or contains non-digits.
    #[error("{}", .0.requirement())]
    InvalidFormat(CardField),

    /// The card matched the synthetic decline rule.
    #[error("Invalid card number")]
    Declined,
}

/// Validate card number, CVV, and PIN.
///
/// Format rules: the number is exactly 16 ASCII digits, the CVV exactly 3,
/// the PIN exactly 4. Format is checked before the decline rule, so a
/// malformed number reports its format problem rather than a decline.
///
/// # Errors
///
/// Returns [`CardError::InvalidFormat`] naming the offending field, or
/// [`CardError::Declined`] for any number ending in `0000`.
pub fn validate_card(number: &str, cvv: &str, pin: &str) -> Result<(), CardError> {
    if !digits_exact(number, 16) {
        return Err(CardError::InvalidFormat(CardField::Number));
    }
    if !digits_exact(cvv, 3) {
        return Err(CardError::InvalidFormat(CardField::Cvv));
    }
    if !digits_exact(pin, 4) {
        return Err(CardError::InvalidFormat(CardField::Pin));
    }

    if number.ends_with(DECLINE_SUFFIX) {
        return Err(CardError::Declined);
    }

    Ok(())
}

fn digits_exact(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// A card expiry period: two-digit year plus month (1-12).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPeriod {
    /// Two-digit year (calendar year mod 100).
    pub year: u32,
    /// Month, 1-12.
    pub month: u32,
}

/// The current expiry period for `now`, i.e. (year mod 100, month).
#[must_use]
pub fn current_period(now: DateTime<Utc>) -> ExpiryPeriod {
    ExpiryPeriod {
        year: now.year().rem_euclid(100).unsigned_abs(),
        month: now.month(),
    }
}

/// Whether a card expiring at `expiry` is expired as of `current`.
///
/// A card is expired only when its period is strictly before the current
/// one: a card expiring this month is still valid.
#[must_use]
pub const fn is_expired(expiry: ExpiryPeriod, current: ExpiryPeriod) -> bool {
    expiry.year < current.year || (expiry.year == current.year && expiry.month < current.month)
}
