//! CORS layer for the storefront UI.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

/// Build the CORS layer allowing the configured storefront origin.
///
/// Credentials are allowed and the `Authorization` header is accepted so the
/// browser client can send bearer tokens.
///
/// # Errors
///
/// Returns an error if `origin` is not a valid header value.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, header::InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}
