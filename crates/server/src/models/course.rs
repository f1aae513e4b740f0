//! Course catalog domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coursehaven_core::{AdminId, CourseId, Price};

/// A purchasable course in the catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique course ID.
    pub id: CourseId,
    /// Course title.
    pub title: String,
    /// Course description.
    pub description: String,
    /// Current list price, strictly positive. Purchases snapshot this value
    /// into the payment record; later price changes affect future purchases
    /// only.
    pub price: Price,
    /// Hosted cover image reference.
    pub image: CourseImage,
    /// The admin who created this course. Lookup-only relation: deleting the
    /// admin does not cascade here.
    pub creator_id: AdminId,
    /// When the course was created.
    pub created_at: DateTime<Utc>,
    /// When the course was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Reference to a hosted course image.
///
/// The image itself lives with an external host; the catalog stores only the
/// host-assigned ID and the public URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseImage {
    /// Host-assigned identifier for the stored image.
    pub public_id: String,
    /// Publicly reachable URL of the image.
    pub url: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_course_serializes_camel_case() {
        let course = Course {
            id: CourseId::new(3),
            title: "Rust for Web".to_owned(),
            description: "Build APIs".to_owned(),
            price: Price::new(Decimal::from(499)).unwrap(),
            image: CourseImage {
                public_id: "img-1".to_owned(),
                url: "https://images.example.com/img-1.png".to_owned(),
            },
            creator_id: AdminId::new(7),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&course).unwrap();
        assert_eq!(json["creatorId"], 7);
        assert_eq!(json["image"]["publicId"], "img-1");
        assert!(json.get("creator_id").is_none());
    }
}
