//! HTTP middleware for the API.
//!
//! # Layer Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS (storefront UI origin)
//! 4. Route handlers with [`AuthUser`] / [`AuthAdmin`] extractors

pub mod auth;
pub mod cors;

pub use auth::{AuthAdmin, AuthUser};
pub use cors::cors_layer;
