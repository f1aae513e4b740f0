//! Payment gateway seam.
//!
//! The orchestrator charges through this trait so a real card-network
//! integration can be substituted without touching the checkout contract.
//! The bundled [`SyntheticGateway`] settles instantly; card format and
//! decline checks happen before the gateway is consulted (see
//! [`card::validate_card`]).
//!
//! [`card::validate_card`]: super::card::validate_card

use async_trait::async_trait;
use thiserror::Error;

use coursehaven_core::{PaymentStatus, Price};

/// A charge to authorize and settle.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    /// Full card number (not retained anywhere past the charge).
    pub card_number: String,
    /// Name on the card.
    pub card_holder: String,
    /// Amount to charge.
    pub amount: Price,
}

/// Outcome of a gateway charge.
#[derive(Debug, Clone, Copy)]
pub struct ChargeOutcome {
    /// Settlement status to record on the payment.
    pub status: PaymentStatus,
}

/// Gateway-side failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway refused the charge.
    #[error("charge rejected: {0}")]
    Rejected(String),

    /// The gateway could not be reached.
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Settlement capability used by the checkout orchestrator.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Authorize and settle a charge.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the charge is refused or the gateway is
    /// unreachable; the orchestrator aborts before writing any records.
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, GatewayError>;
}

/// Demo gateway: no network, every charge settles immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticGateway;

#[async_trait]
impl PaymentGateway for SyntheticGateway {
    async fn charge(&self, _request: &ChargeRequest) -> Result<ChargeOutcome, GatewayError> {
        Ok(ChargeOutcome {
            status: PaymentStatus::Success,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursehaven_core::Price;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_synthetic_gateway_settles_immediately() {
        let request = ChargeRequest {
            card_number: "4111111111111111".to_owned(),
            card_holder: "JOHN DOE".to_owned(),
            amount: Price::new(Decimal::from(499)).expect("positive"),
        };

        let outcome = SyntheticGateway
            .charge(&request)
            .await
            .expect("synthetic gateway never fails");
        assert_eq!(outcome.status, PaymentStatus::Success);
    }
}
