//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ApiError` type that captures server-side failures to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, ApiError>`. Every failure body uses the `{"errors": ...}`
//! envelope: a string for single messages, an array of `{field, message}`
//! objects for per-field validation failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::db::StoreError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;

/// A single per-field validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// Wire-format (camelCase) field name.
    pub field: &'static str,
    /// User-facing message.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout operation failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map to an HTTP status and the `errors` payload for the client.
    ///
    /// Server-side failures always map to a generic message; internal detail
    /// stays in logs and Sentry.
    fn status_and_errors(&self) -> (StatusCode, Value) {
        match self {
            Self::Auth(err) => match err {
                AuthError::Validation(fields) => (StatusCode::BAD_REQUEST, json!(fields)),
                AuthError::AccountExists(_) => (StatusCode::BAD_REQUEST, json!(err.to_string())),
                AuthError::UnknownAccount(_) => (StatusCode::NOT_FOUND, json!(err.to_string())),
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, json!("Invalid credentials"))
                }
                AuthError::PasswordHash | AuthError::Store(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, json!("Internal server error"))
                }
            },
            Self::Checkout(err) => match err {
                CheckoutError::Validation(fields) => (StatusCode::BAD_REQUEST, json!(fields)),
                CheckoutError::CourseNotFound => {
                    (StatusCode::NOT_FOUND, json!("Course not found"))
                }
                CheckoutError::AlreadyPurchased => {
                    (StatusCode::BAD_REQUEST, json!("Course already purchased"))
                }
                CheckoutError::Card(card_err) => {
                    (StatusCode::BAD_REQUEST, json!(card_err.to_string()))
                }
                CheckoutError::CardExpired => {
                    (StatusCode::BAD_REQUEST, json!("Card has expired"))
                }
                CheckoutError::Gateway(_) => {
                    (StatusCode::BAD_GATEWAY, json!("Payment processing failed"))
                }
                CheckoutError::Store(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!("Payment processing failed"),
                ),
            },
            Self::Store(err) => match err {
                StoreError::NotFound => (StatusCode::NOT_FOUND, json!("Course not found")),
                StoreError::NotOwner => (
                    StatusCode::FORBIDDEN,
                    json!("Course was created by another admin"),
                ),
                StoreError::EmailTaken => {
                    (StatusCode::CONFLICT, json!("Email already registered"))
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, json!("Internal server error")),
            },
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, json!(msg)),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!(msg)),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!(msg)),
            Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!("Internal server error"))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, errors) = self.status_and_errors();

        // Capture server errors to Sentry; clients only see the generic body.
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "errors": errors }))).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
