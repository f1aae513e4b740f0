//! `PostgreSQL` storage backend.
//!
//! All queries use the runtime query API with explicit binds; rows are
//! mapped through the typed wrappers in `coursehaven-core`, so invalid
//! stored values (bad email, non-positive price) surface as errors instead
//! of leaking into the domain.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use coursehaven_core::{
    AdminId, CourseId, Email, PaymentId, PaymentStatus, Price, PurchaseId, UserId,
};

use super::{
    AdminStore, CheckoutDraft, CheckoutRecord, CheckoutStore, CourseStore, CourseUpdate,
    NewAccount, NewCourse, StoreError, UserStore,
};
use crate::models::{Admin, Course, CourseImage, Payment, Purchase, TransactionId, User};

/// Unique constraint guarding the one-purchase-per-(user, course) invariant.
const PURCHASE_KEY: &str = "purchases_user_course_key";
/// Unique constraint guarding transaction ID uniqueness.
const TRANSACTION_KEY: &str = "payments_transaction_id_key";

/// Storage backend over a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool (used by health checks and the CLI).
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    Ok(User {
        id: row.try_get::<UserId, _>("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get::<Email, _>("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn admin_from_row(row: &PgRow) -> Result<Admin, StoreError> {
    Ok(Admin {
        id: row.try_get::<AdminId, _>("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get::<Email, _>("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn course_from_row(row: &PgRow) -> Result<Course, StoreError> {
    Ok(Course {
        id: row.try_get::<CourseId, _>("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        price: row.try_get::<Price, _>("price")?,
        image: CourseImage {
            public_id: row.try_get("image_public_id")?,
            url: row.try_get("image_url")?,
        },
        creator_id: row.try_get::<AdminId, _>("creator_id")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn purchase_from_row(row: &PgRow) -> Result<Purchase, StoreError> {
    Ok(Purchase {
        id: row.try_get::<PurchaseId, _>("id")?,
        user_id: row.try_get::<UserId, _>("user_id")?,
        course_id: row.try_get::<CourseId, _>("course_id")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn payment_from_row(row: &PgRow) -> Result<Payment, StoreError> {
    Ok(Payment {
        id: row.try_get::<PaymentId, _>("id")?,
        user_id: row.try_get::<UserId, _>("user_id")?,
        course_id: row.try_get::<CourseId, _>("course_id")?,
        amount: row.try_get::<Price, _>("amount")?,
        card_last_four: row.try_get("card_last_four")?,
        transaction_id: row.try_get::<TransactionId, _>("transaction_id")?,
        status: row.try_get::<PaymentStatus, _>("status")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

/// Map a unique violation on the email column to [`StoreError::EmailTaken`].
fn map_email_conflict(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return StoreError::EmailTaken;
    }
    StoreError::Database(e)
}

/// Map checkout unique violations to their domain errors by constraint name.
fn map_checkout_conflict(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        match db_err.constraint() {
            Some(PURCHASE_KEY) => return StoreError::DuplicatePurchase,
            Some(TRANSACTION_KEY) => return StoreError::DuplicateTransactionId,
            _ => {}
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new_user: NewAccount) -> Result<User, StoreError> {
        let row = sqlx::query(
            r"
            INSERT INTO users (first_name, last_name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, email, password_hash, created_at, updated_at
            ",
        )
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_email_conflict)?;

        user_from_row(&row)
    }

    async fn user_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT id, first_name, last_name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT id, first_name, last_name, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }
}

#[async_trait]
impl AdminStore for PgStore {
    async fn create_admin(&self, new_admin: NewAccount) -> Result<Admin, StoreError> {
        let row = sqlx::query(
            r"
            INSERT INTO admins (first_name, last_name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, email, password_hash, created_at, updated_at
            ",
        )
        .bind(&new_admin.first_name)
        .bind(&new_admin.last_name)
        .bind(&new_admin.email)
        .bind(&new_admin.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_email_conflict)?;

        admin_from_row(&row)
    }

    async fn admin_by_email(&self, email: &Email) -> Result<Option<Admin>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT id, first_name, last_name, email, password_hash, created_at, updated_at
            FROM admins
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(admin_from_row).transpose()
    }

    async fn admin_by_id(&self, id: AdminId) -> Result<Option<Admin>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT id, first_name, last_name, email, password_hash, created_at, updated_at
            FROM admins
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(admin_from_row).transpose()
    }
}

#[async_trait]
impl CourseStore for PgStore {
    async fn create_course(&self, new_course: NewCourse) -> Result<Course, StoreError> {
        let row = sqlx::query(
            r"
            INSERT INTO courses (title, description, price, image_public_id, image_url, creator_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, price, image_public_id, image_url, creator_id,
                      created_at, updated_at
            ",
        )
        .bind(&new_course.title)
        .bind(&new_course.description)
        .bind(new_course.price)
        .bind(&new_course.image.public_id)
        .bind(&new_course.image.url)
        .bind(new_course.creator_id)
        .fetch_one(&self.pool)
        .await?;

        course_from_row(&row)
    }

    async fn update_course(
        &self,
        id: CourseId,
        editor: AdminId,
        update: CourseUpdate,
    ) -> Result<Course, StoreError> {
        let row = sqlx::query(
            r"
            UPDATE courses
            SET title = $3, description = $4, price = $5,
                image_public_id = $6, image_url = $7, updated_at = now()
            WHERE id = $1 AND creator_id = $2
            RETURNING id, title, description, price, image_public_id, image_url, creator_id,
                      created_at, updated_at
            ",
        )
        .bind(id)
        .bind(editor)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.price)
        .bind(&update.image.public_id)
        .bind(&update.image.url)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => course_from_row(&row),
            None => Err(self.ownership_failure(id).await?),
        }
    }

    async fn delete_course(&self, id: CourseId, editor: AdminId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1 AND creator_id = $2")
            .bind(id)
            .bind(editor)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(self.ownership_failure(id).await?);
        }

        Ok(())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, description, price, image_public_id, image_url, creator_id,
                   created_at, updated_at
            FROM courses
            ORDER BY created_at ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(course_from_row).collect()
    }

    async fn courses_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>, StoreError> {
        let raw_ids: Vec<i32> = ids.iter().map(CourseId::as_i32).collect();

        let rows = sqlx::query(
            r"
            SELECT id, title, description, price, image_public_id, image_url, creator_id,
                   created_at, updated_at
            FROM courses
            WHERE id = ANY($1)
            ORDER BY created_at ASC
            ",
        )
        .bind(&raw_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(course_from_row).collect()
    }

    async fn course_by_id(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT id, title, description, price, image_public_id, image_url, creator_id,
                   created_at, updated_at
            FROM courses
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(course_from_row).transpose()
    }
}

impl PgStore {
    /// Distinguish "course missing" from "course owned by someone else" after
    /// a creator-scoped write matched zero rows.
    async fn ownership_failure(&self, id: CourseId) -> Result<StoreError, StoreError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        let exists: bool = row.try_get(0)?;
        Ok(if exists {
            StoreError::NotOwner
        } else {
            StoreError::NotFound
        })
    }
}

#[async_trait]
impl CheckoutStore for PgStore {
    async fn has_purchased(&self, user: UserId, course: CourseId) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM purchases WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user)
        .bind(course)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get(0)?)
    }

    async fn commit_checkout(&self, draft: CheckoutDraft) -> Result<CheckoutRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Both inserts share one transaction: a failure (including the losing
        // side of a duplicate-purchase race) rolls back the payment as well,
        // so no orphaned payment is ever visible.
        let payment_row = sqlx::query(
            r"
            INSERT INTO payments (user_id, course_id, amount, card_last_four, transaction_id, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, course_id, amount, card_last_four, transaction_id, status,
                      created_at
            ",
        )
        .bind(draft.user_id)
        .bind(draft.course_id)
        .bind(draft.amount)
        .bind(&draft.card_last_four)
        .bind(&draft.transaction_id)
        .bind(draft.status)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_checkout_conflict)?;

        let purchase_row = sqlx::query(
            r"
            INSERT INTO purchases (user_id, course_id)
            VALUES ($1, $2)
            RETURNING id, user_id, course_id, created_at
            ",
        )
        .bind(draft.user_id)
        .bind(draft.course_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_checkout_conflict)?;

        tx.commit().await?;

        Ok(CheckoutRecord {
            payment: payment_from_row(&payment_row)?,
            purchase: purchase_from_row(&purchase_row)?,
        })
    }

    async fn purchases_for_user(&self, user: UserId) -> Result<Vec<Purchase>, StoreError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, course_id, created_at
            FROM purchases
            WHERE user_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(purchase_from_row).collect()
    }
}
