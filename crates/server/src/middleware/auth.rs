//! Authentication extractors.
//!
//! Provides extractors for requiring a bearer token in route handlers. User
//! and admin tokens are signed with separate secrets, so the two extractors
//! cannot be satisfied by each other's tokens.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use coursehaven_core::{AdminId, UserId};

use crate::state::AppState;

/// Extractor that requires a valid user bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     AuthUser(user_id): AuthUser,
/// ) -> impl IntoResponse {
///     format!("Hello, user {user_id}!")
/// }
/// ```
pub struct AuthUser(pub UserId);

/// Extractor that requires a valid admin bearer token.
pub struct AuthAdmin(pub AdminId);

/// Error returned when a bearer token is missing or fails verification.
pub enum AuthRejection {
    /// No `Authorization: Bearer` header on the request.
    MissingToken,
    /// The token failed verification (malformed, expired, wrong audience).
    InvalidToken,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::MissingToken => "no token provided",
            Self::InvalidToken => "invalid token",
        };
        (StatusCode::UNAUTHORIZED, Json(json!({ "errors": message }))).into_response()
    }
}

/// Pull the token out of the `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Result<&str, AuthRejection> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthRejection::MissingToken)
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = bearer_token(parts)?;

        let user_id = state
            .tokens()
            .verify_user(token)
            .map_err(|_| AuthRejection::InvalidToken)?;

        Ok(Self(user_id))
    }
}

impl<S> FromRequestParts<S> for AuthAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = bearer_token(parts)?;

        let admin_id = state
            .tokens()
            .verify_admin(token)
            .map_err(|_| AuthRejection::InvalidToken)?;

        Ok(Self(admin_id))
    }
}
