//! Payment route handlers.

use axum::{Json, extract::State, response::IntoResponse};

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::services::checkout::{CheckoutService, PaymentRequest};
use crate::state::AppState;

/// Process a course purchase for the authenticated user.
///
/// POST /api/v1/payment/process
///
/// On success exactly one payment and one purchase have been committed
/// atomically; the response carries the transaction ID for the confirmation
/// screen and the purchase record for the purchases view.
///
/// # Errors
///
/// Returns 400 for validation/card/business-rule failures, 404 if the course
/// does not exist, and 500 for storage failures.
pub async fn process(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<PaymentRequest>,
) -> Result<impl IntoResponse> {
    let checkout = CheckoutService::new(state.store(), state.gateway());

    let receipt = checkout.purchase(user_id, &request).await?;

    tracing::info!(
        user_id = %user_id,
        course_id = %receipt.purchase.course_id,
        transaction_id = %receipt.transaction_id,
        "purchase committed"
    );

    Ok(Json(serde_json::json!({
        "message": "Payment successful",
        "transactionId": receipt.transaction_id,
        "purchase": receipt.purchase,
    })))
}
