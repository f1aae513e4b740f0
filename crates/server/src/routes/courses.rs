//! Course catalog route handlers.
//!
//! Creation, update, and deletion require an admin token; update and delete
//! are additionally restricted to the course's creator. Listing and details
//! are public so the storefront can render the catalog without a session.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use coursehaven_core::{CourseId, Price};

use crate::db::{CourseUpdate, NewCourse};
use crate::error::{ApiError, Result};
use crate::middleware::AuthAdmin;
use crate::models::CourseImage;
use crate::state::AppState;

/// Course create/update request body. All fields are required; the original
/// storefront sends the full course on update as well.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image: Option<CourseImage>,
}

/// Validated course content shared by create and update.
struct CourseContent {
    title: String,
    description: String,
    price: Price,
    image: CourseImage,
}

impl CourseForm {
    fn validate(self) -> Result<CourseContent> {
        let (Some(title), Some(description), Some(price), Some(image)) =
            (self.title, self.description, self.price, self.image)
        else {
            return Err(ApiError::BadRequest("All fields are required".to_owned()));
        };

        if title.trim().is_empty() || description.trim().is_empty() {
            return Err(ApiError::BadRequest("All fields are required".to_owned()));
        }

        let price = Price::new(price)
            .map_err(|_| ApiError::BadRequest("Price must be greater than zero".to_owned()))?;

        Ok(CourseContent {
            title,
            description,
            price,
            image,
        })
    }
}

/// Create a course owned by the authenticated admin.
///
/// POST /api/v1/course/create
///
/// # Errors
///
/// Returns 400 if any field is missing or the price is not positive.
pub async fn create(
    State(state): State<AppState>,
    AuthAdmin(admin_id): AuthAdmin,
    Json(form): Json<CourseForm>,
) -> Result<impl IntoResponse> {
    let content = form.validate()?;

    let course = state
        .store()
        .create_course(NewCourse {
            title: content.title,
            description: content.description,
            price: content.price,
            image: content.image,
            creator_id: admin_id,
        })
        .await?;

    tracing::info!(course_id = %course.id, admin_id = %admin_id, "course created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Course created successfully",
            "course": course,
        })),
    ))
}

/// Replace a course's content. Only its creator may do this.
///
/// PUT /api/v1/course/update/{courseId}
///
/// # Errors
///
/// Returns 404 if the course is missing and 403 if it belongs to another
/// admin.
pub async fn update(
    State(state): State<AppState>,
    AuthAdmin(admin_id): AuthAdmin,
    Path(course_id): Path<i32>,
    Json(form): Json<CourseForm>,
) -> Result<impl IntoResponse> {
    let content = form.validate()?;

    let course = state
        .store()
        .update_course(
            CourseId::new(course_id),
            admin_id,
            CourseUpdate {
                title: content.title,
                description: content.description,
                price: content.price,
                image: content.image,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Course updated successfully",
        "course": course,
    })))
}

/// Delete a course. Only its creator may do this.
///
/// DELETE /api/v1/course/delete/{courseId}
///
/// Purchases and payments referencing the course are retained: the ledger is
/// append-only and past transactions stay reconcilable.
///
/// # Errors
///
/// Returns 404 if the course is missing and 403 if it belongs to another
/// admin.
pub async fn remove(
    State(state): State<AppState>,
    AuthAdmin(admin_id): AuthAdmin,
    Path(course_id): Path<i32>,
) -> Result<impl IntoResponse> {
    state
        .store()
        .delete_course(CourseId::new(course_id), admin_id)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Course deleted successfully",
    })))
}

/// List the whole catalog.
///
/// GET /api/v1/course/courses
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let courses = state.store().list_courses().await?;

    Ok(Json(serde_json::json!({ "courses": courses })))
}

/// Fetch one course.
///
/// GET /api/v1/course/{courseId}
///
/// # Errors
///
/// Returns 404 if the course does not exist.
pub async fn details(
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<impl IntoResponse> {
    let course = state
        .store()
        .course_by_id(CourseId::new(course_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_owned()))?;

    Ok(Json(serde_json::json!({ "course": course })))
}
