//! Business-logic services.
//!
//! - [`auth`] - account registration, login, and bearer tokens
//! - [`card`] - pure card format/decline/expiry validation
//! - [`gateway`] - the pluggable payment-settlement seam
//! - [`checkout`] - the purchase orchestrator tying it all together

pub mod auth;
pub mod card;
pub mod checkout;
pub mod gateway;

pub use auth::{AuthService, TokenService};
pub use checkout::{CheckoutReceipt, CheckoutService, PaymentRequest};
pub use gateway::{PaymentGateway, SyntheticGateway};
