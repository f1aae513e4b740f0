//! Admin account route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use coursehaven_core::{AdminId, Email};

use crate::error::Result;
use crate::models::Admin;
use crate::routes::users::{LoginForm, SignupForm};
use crate::services::auth::{AuthService, Signup};
use crate::state::AppState;

/// Admin account fields safe to expose to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponse {
    pub id: AdminId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Admin> for AdminResponse {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            first_name: admin.first_name,
            last_name: admin.last_name,
            email: admin.email,
            created_at: admin.created_at,
            updated_at: admin.updated_at,
        }
    }
}

/// Register a new admin.
///
/// POST /api/v1/admin/signup
///
/// # Errors
///
/// Returns per-field validation errors or an already-exists conflict.
pub async fn signup(
    State(state): State<AppState>,
    Json(form): Json<SignupForm>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.store());

    let admin = auth
        .register_admin(Signup {
            first_name: form.first_name.as_deref(),
            last_name: form.last_name.as_deref(),
            email: form.email.as_deref(),
            password: form.password.as_deref(),
        })
        .await?;

    tracing::info!(admin_id = %admin.id, "admin signed up");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Signup succeeded",
            "admin": AdminResponse::from(admin),
        })),
    ))
}

/// Log an admin in and issue a bearer token.
///
/// POST /api/v1/admin/login
///
/// # Errors
///
/// Returns 404 for an unknown email and 401 for a wrong password.
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.store());

    let admin = auth
        .login_admin(
            form.email.as_deref().unwrap_or_default(),
            form.password.as_deref().unwrap_or_default(),
        )
        .await?;

    let token = state
        .tokens()
        .issue_admin(admin.id)
        .map_err(|_| crate::error::ApiError::Internal("token signing failed".to_owned()))?;

    Ok(Json(serde_json::json!({
        "message": "Login successful",
        "admin": AdminResponse::from(admin),
        "token": token,
    })))
}

/// Acknowledge logout.
///
/// GET /api/v1/admin/logout
///
/// Tokens are held client-side only, so logout is simply the client
/// discarding its token; there is no server-side session to clear.
pub async fn logout() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Logout successful" }))
}
