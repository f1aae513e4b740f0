//! Storage layer: trait seams plus the `PostgreSQL` and in-memory backends.
//!
//! # Tables
//!
//! - `users` / `admins` - accounts (separate tables, separate token audiences)
//! - `courses` - the catalog; `creator_id` is a lookup-only reference
//! - `purchases` - append-only ledger with `UNIQUE (user_id, course_id)`
//! - `payments` - immutable records with `UNIQUE (transaction_id)`
//!
//! The unique constraints are the authority for duplicate detection; any
//! read-before-write existence check above this layer is an optimization.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p coursehaven-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use coursehaven_core::{AdminId, CourseId, Email, PaymentStatus, Price, UserId};

use crate::models::{Admin, Course, CourseImage, Payment, Purchase, TransactionId, User};

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Errors surfaced by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The referenced record does not exist.
    #[error("record not found")]
    NotFound,

    /// The record exists but belongs to a different admin.
    #[error("record belongs to another admin")]
    NotOwner,

    /// An account with this email already exists.
    #[error("email already registered")]
    EmailTaken,

    /// A purchase already exists for this (user, course) pair.
    #[error("course already purchased")]
    DuplicatePurchase,

    /// The generated transaction ID collided with an existing payment.
    #[error("transaction id already recorded")]
    DuplicateTransactionId,

    /// A stored value failed validation on the way out.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Input for creating a user account. The password is hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password_hash: String,
}

/// Input for creating a course.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub image: CourseImage,
    pub creator_id: AdminId,
}

/// Full-record update for a course. Only the creator may apply it.
#[derive(Debug, Clone)]
pub struct CourseUpdate {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub image: CourseImage,
}

/// Everything needed to commit a checkout: one payment plus one purchase,
/// written as a single atomic unit.
#[derive(Debug, Clone)]
pub struct CheckoutDraft {
    pub user_id: UserId,
    pub course_id: CourseId,
    /// Course price snapshot.
    pub amount: Price,
    pub card_last_four: String,
    pub transaction_id: TransactionId,
    pub status: PaymentStatus,
}

/// The committed pair produced by [`CheckoutStore::commit_checkout`].
#[derive(Debug, Clone)]
pub struct CheckoutRecord {
    pub payment: Payment,
    pub purchase: Purchase,
}

/// Customer account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user. Fails with [`StoreError::EmailTaken`] on a duplicate
    /// email.
    async fn create_user(&self, new_user: NewAccount) -> Result<User, StoreError>;

    /// Look up a user by normalized email.
    async fn user_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    /// Look up a user by ID.
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
}

/// Admin account storage.
#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Create an admin. Fails with [`StoreError::EmailTaken`] on a duplicate
    /// email.
    async fn create_admin(&self, new_admin: NewAccount) -> Result<Admin, StoreError>;

    /// Look up an admin by normalized email.
    async fn admin_by_email(&self, email: &Email) -> Result<Option<Admin>, StoreError>;

    /// Look up an admin by ID.
    async fn admin_by_id(&self, id: AdminId) -> Result<Option<Admin>, StoreError>;
}

/// Course catalog storage.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Create a course owned by `new_course.creator_id`.
    async fn create_course(&self, new_course: NewCourse) -> Result<Course, StoreError>;

    /// Replace a course's content. Fails with [`StoreError::NotFound`] if the
    /// course does not exist and [`StoreError::NotOwner`] if it was created
    /// by a different admin.
    async fn update_course(
        &self,
        id: CourseId,
        editor: AdminId,
        update: CourseUpdate,
    ) -> Result<Course, StoreError>;

    /// Delete a course. Same ownership rules as [`Self::update_course`].
    async fn delete_course(&self, id: CourseId, editor: AdminId) -> Result<(), StoreError>;

    /// List the whole catalog.
    async fn list_courses(&self) -> Result<Vec<Course>, StoreError>;

    /// Fetch the courses matching `ids` (missing IDs are skipped).
    async fn courses_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>, StoreError>;

    /// Look up a course by ID.
    async fn course_by_id(&self, id: CourseId) -> Result<Option<Course>, StoreError>;
}

/// Purchase ledger and payment recording.
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    /// Whether a committed purchase exists for this (user, course) pair.
    ///
    /// Reflects all committed purchases including concurrent ones, but a
    /// `false` answer can go stale immediately; only
    /// [`Self::commit_checkout`] resolves races.
    async fn has_purchased(&self, user: UserId, course: CourseId) -> Result<bool, StoreError>;

    /// Atomically record one payment and one purchase.
    ///
    /// Either both records are committed or neither is; a caller that dies
    /// mid-flight leaves no orphaned payment behind.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DuplicatePurchase`] if a purchase for the pair already
    ///   exists (the losing side of a race lands here)
    /// - [`StoreError::DuplicateTransactionId`] if the transaction ID is
    ///   already recorded; the caller regenerates and retries
    async fn commit_checkout(&self, draft: CheckoutDraft) -> Result<CheckoutRecord, StoreError>;

    /// All purchases committed by a user, oldest first.
    async fn purchases_for_user(&self, user: UserId) -> Result<Vec<Purchase>, StoreError>;
}

/// The full storage surface the server needs, as one trait object.
pub trait Store: UserStore + AdminStore + CourseStore + CheckoutStore {}

impl<T: UserStore + AdminStore + CourseStore + CheckoutStore> Store for T {}
