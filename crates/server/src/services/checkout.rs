//! Checkout orchestration.
//!
//! Sequences one purchase attempt: request-shape validation, course lookup,
//! duplicate check, card validation, expiry check, gateway charge, and the
//! atomic payment+purchase commit. Any failing step aborts the attempt with
//! no partial state: the two records are written in a single storage
//! transaction, and everything before that writes nothing at all.
//!
//! Concurrent attempts for the same (user, course) pair are resolved by the
//! storage layer's unique purchase constraint: exactly one attempt commits
//! and the rest observe [`CheckoutError::AlreadyPurchased`]. The
//! `has_purchased` pre-check only exists to answer the common case cheaply.

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use coursehaven_core::{CourseId, UserId};

use crate::db::{CheckoutDraft, Store, StoreError};
use crate::error::FieldError;
use crate::models::{Payment, Purchase, TransactionId};
use crate::services::card::{self, CardError, ExpiryPeriod};
use crate::services::gateway::{ChargeRequest, GatewayError, PaymentGateway};

/// How many fresh transaction IDs to try before giving up on a collision.
const MAX_TRANSACTION_ATTEMPTS: u32 = 3;

/// Payment form body as received on the wire.
///
/// All fields arrive as optional so shape validation can report every
/// missing or malformed field at once; unknown fields are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PaymentRequest {
    pub course_id: Option<i32>,
    pub card_number: Option<String>,
    pub card_holder: Option<String>,
    pub expiry_month: Option<String>,
    pub expiry_year: Option<String>,
    pub cvv: Option<String>,
    pub pin: Option<String>,
}

/// A shape-validated payment request.
#[derive(Debug, Clone)]
struct ValidPayment {
    course_id: CourseId,
    card_number: String,
    card_holder: String,
    expiry: ExpiryPeriod,
    cvv: String,
    pin: String,
}

impl PaymentRequest {
    /// Validate field presence and formats, collecting every failure.
    fn validate(&self) -> Result<ValidPayment, Vec<FieldError>> {
        let mut errors = Vec::new();

        let course_id = self.course_id.map(CourseId::new);
        if course_id.is_none() {
            errors.push(FieldError::new("courseId", "Course ID is required"));
        }

        let card_number = self.card_number.clone().unwrap_or_default();
        if card_number.len() != 16 {
            errors.push(FieldError::new(
                "cardNumber",
                "Card number must be 16 digits",
            ));
        }

        let card_holder = self.card_holder.clone().unwrap_or_default();
        if card_holder.trim().len() < 3 {
            errors.push(FieldError::new(
                "cardHolder",
                "Card holder name is required",
            ));
        }

        let month = parse_month(self.expiry_month.as_deref());
        if month.is_none() {
            errors.push(FieldError::new("expiryMonth", "Invalid month"));
        }

        let year = parse_two_digit_year(self.expiry_year.as_deref());
        if year.is_none() {
            errors.push(FieldError::new("expiryYear", "Invalid year"));
        }

        let cvv = self.cvv.clone().unwrap_or_default();
        if cvv.len() != 3 {
            errors.push(FieldError::new("cvv", "CVV must be 3 digits"));
        }

        let pin = self.pin.clone().unwrap_or_default();
        if pin.len() != 4 {
            errors.push(FieldError::new("pin", "PIN must be 4 digits"));
        }

        match (course_id, month, year) {
            (Some(course_id), Some(month), Some(year)) if errors.is_empty() => Ok(ValidPayment {
                course_id,
                card_number,
                card_holder: card_holder.trim().to_owned(),
                expiry: ExpiryPeriod { year, month },
                cvv,
                pin,
            }),
            _ => Err(errors),
        }
    }
}

/// `01`-`12`, leading zero required for single-digit months.
fn parse_month(input: Option<&str>) -> Option<u32> {
    let s = input?;
    if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month: u32 = s.parse().ok()?;
    (1..=12).contains(&month).then_some(month)
}

/// Exactly two digits.
fn parse_two_digit_year(input: Option<&str>) -> Option<u32> {
    let s = input?;
    if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Failures a purchase attempt can end in.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Request shape validation failed (per-field messages).
    #[error("payment request validation failed")]
    Validation(Vec<FieldError>),

    /// The course does not exist.
    #[error("course not found")]
    CourseNotFound,

    /// The user already owns this course.
    #[error("course already purchased")]
    AlreadyPurchased,

    /// Card format failure or synthetic decline.
    #[error(transparent)]
    Card(#[from] CardError),

    /// The card's expiry period is strictly before the current one.
    #[error("card has expired")]
    CardExpired,

    /// The payment gateway refused or could not be reached.
    #[error("gateway failure: {0}")]
    Gateway(#[from] GatewayError),

    /// Storage failure (including exhausted transaction-ID retries).
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

/// The result of a committed purchase.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    /// Transaction identifier for user-facing confirmation.
    pub transaction_id: TransactionId,
    /// The recorded payment.
    pub payment: Payment,
    /// The committed purchase.
    pub purchase: Purchase,
}

/// Orchestrates one purchase attempt end to end.
pub struct CheckoutService<'a> {
    store: &'a dyn Store,
    gateway: &'a dyn PaymentGateway,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(store: &'a dyn Store, gateway: &'a dyn PaymentGateway) -> Self {
        Self { store, gateway }
    }

    /// Run one purchase attempt.
    ///
    /// On success exactly one payment and one purchase have been committed
    /// together; on any failure nothing has been written.
    ///
    /// # Errors
    ///
    /// Returns the [`CheckoutError`] for the first failing step. A
    /// duplicate-purchase conflict detected at commit time (the losing side
    /// of a race) surfaces as [`CheckoutError::AlreadyPurchased`], same as
    /// one caught by the pre-check.
    pub async fn purchase(
        &self,
        user_id: UserId,
        request: &PaymentRequest,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let valid = request.validate().map_err(CheckoutError::Validation)?;

        let course = self
            .store
            .course_by_id(valid.course_id)
            .await?
            .ok_or(CheckoutError::CourseNotFound)?;

        // Advisory fast path; the commit below is the authoritative check.
        if self.store.has_purchased(user_id, valid.course_id).await? {
            return Err(CheckoutError::AlreadyPurchased);
        }

        card::validate_card(&valid.card_number, &valid.cvv, &valid.pin)?;

        if card::is_expired(valid.expiry, card::current_period(Utc::now())) {
            return Err(CheckoutError::CardExpired);
        }

        let outcome = self
            .gateway
            .charge(&ChargeRequest {
                card_number: valid.card_number.clone(),
                card_holder: valid.card_holder.clone(),
                amount: course.price,
            })
            .await?;

        let card_last_four = valid
            .card_number
            .get(valid.card_number.len().saturating_sub(4)..)
            .unwrap_or_default()
            .to_owned();

        // Transaction IDs are regenerated on collision rather than surfaced:
        // a collision is an internal event, never a user-facing failure.
        let mut attempts = 0;
        loop {
            let draft = CheckoutDraft {
                user_id,
                course_id: valid.course_id,
                amount: course.price,
                card_last_four: card_last_four.clone(),
                transaction_id: TransactionId::generate(),
                status: outcome.status,
            };

            match self.store.commit_checkout(draft).await {
                Ok(record) => {
                    return Ok(CheckoutReceipt {
                        transaction_id: record.payment.transaction_id.clone(),
                        payment: record.payment,
                        purchase: record.purchase,
                    });
                }
                Err(StoreError::DuplicatePurchase) => {
                    return Err(CheckoutError::AlreadyPurchased);
                }
                Err(StoreError::DuplicateTransactionId) => {
                    attempts += 1;
                    warn!(attempts, "transaction id collision, regenerating");
                    if attempts >= MAX_TRANSACTION_ATTEMPTS {
                        return Err(CheckoutError::Store(StoreError::DuplicateTransactionId));
                    }
                }
                Err(other) => return Err(CheckoutError::Store(other)),
            }
        }
    }
}
