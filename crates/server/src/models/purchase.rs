//! Purchase ledger domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use coursehaven_core::{CourseId, PurchaseId, UserId};

/// An append-only record asserting that a user owns access to a course.
///
/// At most one purchase may exist per (user, course) pair; the storage layer
/// enforces this with a unique constraint, which is the race-resolution point
/// for concurrent checkout attempts. Purchases are never mutated or deleted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    /// Unique purchase ID.
    pub id: PurchaseId,
    /// The buying user.
    pub user_id: UserId,
    /// The purchased course.
    pub course_id: CourseId,
    /// When the purchase was committed.
    pub created_at: DateTime<Utc>,
}
