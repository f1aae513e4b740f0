//! Customer account route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coursehaven_core::{CourseId, Email, UserId};

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::User;
use crate::services::auth::{AuthService, Signup};
use crate::state::AppState;

// =============================================================================
// Wire Types
// =============================================================================

/// Signup request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Account fields safe to expose to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for AccountResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new customer.
///
/// POST /api/v1/user/signup
///
/// # Errors
///
/// Returns per-field validation errors or an already-exists conflict.
pub async fn signup(
    State(state): State<AppState>,
    Json(form): Json<SignupForm>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.store());

    let user = auth
        .register_user(Signup {
            first_name: form.first_name.as_deref(),
            last_name: form.last_name.as_deref(),
            email: form.email.as_deref(),
            password: form.password.as_deref(),
        })
        .await?;

    tracing::info!(user_id = %user.id, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Signup succeeded",
            "user": AccountResponse::from(user),
        })),
    ))
}

/// Log a customer in and issue a bearer token.
///
/// POST /api/v1/user/login
///
/// # Errors
///
/// Returns 404 for an unknown email and 401 for a wrong password.
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.store());

    let user = auth
        .login_user(
            form.email.as_deref().unwrap_or_default(),
            form.password.as_deref().unwrap_or_default(),
        )
        .await?;

    let token = state
        .tokens()
        .issue_user(user.id)
        .map_err(|_| crate::error::ApiError::Internal("token signing failed".to_owned()))?;

    Ok(Json(serde_json::json!({
        "message": "Login success",
        "user": AccountResponse::from(user),
        "token": token,
    })))
}

/// List the authenticated user's purchases with the matching courses.
///
/// GET /api/v1/user/purchases
///
/// # Errors
///
/// Returns 401 without a valid user token.
pub async fn purchases(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse> {
    let purchases = state.store().purchases_for_user(user_id).await?;

    let course_ids: Vec<CourseId> = purchases.iter().map(|p| p.course_id).collect();
    let courses = state.store().courses_by_ids(&course_ids).await?;

    Ok(Json(serde_json::json!({
        "purchases": purchases,
        "courses": courses,
    })))
}
