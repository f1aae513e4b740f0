//! Seed the database with a demo admin and sample courses.
//!
//! Intended for local development: gives the storefront a non-empty catalog
//! to render and an admin account to log in with. Safe to re-run; an
//! existing demo admin is reused.

use rust_decimal::Decimal;
use tracing::{info, warn};

use coursehaven_core::{Email, Price};
use coursehaven_server::db::{self, AdminStore, CourseStore, NewCourse, PgStore, StoreError};
use coursehaven_server::models::CourseImage;
use coursehaven_server::services::auth::{AuthError, AuthService, Signup};

use super::{CommandError, database_url};

/// Sample catalog: (title, description, price).
const SAMPLE_COURSES: &[(&str, &str, i64)] = &[
    (
        "Rust Fundamentals",
        "Ownership, borrowing, and the type system from the ground up.",
        499,
    ),
    (
        "Web APIs with Axum",
        "Build and test production JSON APIs.",
        799,
    ),
    (
        "PostgreSQL for Application Developers",
        "Schema design, transactions, and query tuning.",
        649,
    ),
];

/// Seed a demo admin and sample courses.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a write fails.
pub async fn run(email: &str, password: &str) -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let pool = db::create_pool(&database_url()?).await?;
    let store = PgStore::new(pool);
    let auth = AuthService::new(&store);

    let admin = match auth
        .register_admin(Signup {
            first_name: Some("Demo"),
            last_name: Some("Admin"),
            email: Some(email),
            password: Some(password),
        })
        .await
    {
        Ok(admin) => {
            info!(admin_id = %admin.id, "Demo admin created");
            admin
        }
        Err(AuthError::AccountExists(_)) => {
            warn!("Demo admin already exists, reusing it");
            let parsed =
                Email::parse(email).map_err(|e| CommandError::InvalidInput(e.to_string()))?;
            store
                .admin_by_email(&parsed)
                .await?
                .ok_or(CommandError::Store(StoreError::NotFound))?
        }
        Err(e) => return Err(e.into()),
    };

    for (index, (title, description, price)) in SAMPLE_COURSES.iter().enumerate() {
        let price = Price::new(Decimal::from(*price))
            .map_err(|e| CommandError::InvalidInput(e.to_string()))?;

        let course = store
            .create_course(NewCourse {
                title: (*title).to_owned(),
                description: (*description).to_owned(),
                price,
                image: CourseImage {
                    public_id: format!("seed-course-{}", index + 1),
                    url: format!("https://placehold.co/600x400?text=Course+{}", index + 1),
                },
                creator_id: admin.id,
            })
            .await?;

        info!(course_id = %course.id, title = %course.title, "Course seeded");
    }

    info!("Seeding complete!");
    Ok(())
}
