//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use thiserror::Error;

use coursehaven_server::db::StoreError;
use coursehaven_server::services::auth::AuthError;

/// Errors shared by all CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Resolve the database URL from `COURSEHAVEN_DATABASE_URL`, falling back to
/// the generic `DATABASE_URL`.
pub fn database_url() -> Result<SecretString, CommandError> {
    std::env::var("COURSEHAVEN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("COURSEHAVEN_DATABASE_URL"))
}
