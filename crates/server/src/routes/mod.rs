//! HTTP route handlers for the marketplace API.
//!
//! # Route Structure
//!
//! ```text
//! # Accounts
//! POST /api/v1/user/signup       - Register a customer
//! POST /api/v1/user/login        - Customer login (returns bearer token)
//! GET  /api/v1/user/purchases    - Purchased courses (requires user token)
//! POST /api/v1/admin/signup      - Register an admin
//! POST /api/v1/admin/login       - Admin login (returns bearer token)
//! GET  /api/v1/admin/logout      - Stateless logout acknowledgement
//!
//! # Catalog
//! POST   /api/v1/course/create             - Create course (admin token)
//! PUT    /api/v1/course/update/{courseId}  - Update course (creator only)
//! DELETE /api/v1/course/delete/{courseId}  - Delete course (creator only)
//! GET    /api/v1/course/courses            - List catalog (public)
//! GET    /api/v1/course/{courseId}         - Course details (public)
//!
//! # Checkout
//! POST /api/v1/payment/process   - Purchase a course (user token)
//! ```

pub mod admins;
pub mod courses;
pub mod payments;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the user account routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .route("/purchases", get(users::purchases))
}

/// Create the admin account routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(admins::signup))
        .route("/login", post(admins::login))
        .route("/logout", get(admins::logout))
}

/// Create the course catalog routes router.
pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(courses::create))
        .route("/update/{course_id}", put(courses::update))
        .route("/delete/{course_id}", delete(courses::remove))
        .route("/courses", get(courses::list))
        .route("/{course_id}", get(courses::details))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new().route("/process", post(payments::process))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/v1/user", user_routes())
        .nest("/api/v1/admin", admin_routes())
        .nest("/api/v1/course", course_routes())
        .nest("/api/v1/payment", payment_routes())
}
