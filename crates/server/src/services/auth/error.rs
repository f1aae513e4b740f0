//! Authentication error types.

use thiserror::Error;

use crate::db::StoreError;
use crate::error::FieldError;

/// Which account table an auth operation was aimed at.
///
/// Users and admins share signup/login mechanics but live in separate tables
/// and separate token audiences; error messages name the right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    User,
    Admin,
}

impl AccountKind {
    /// Capitalized noun for user-facing messages ("User", "Admin").
    #[must_use]
    pub const fn noun(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Admin => "Admin",
        }
    }
}

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more signup fields failed validation.
    #[error("signup validation failed")]
    Validation(Vec<FieldError>),

    /// An account with this email already exists.
    #[error("{} already exists", .0.noun())]
    AccountExists(AccountKind),

    /// No account with this email.
    #[error("{} does not exist", .0.noun())]
    UnknownAccount(AccountKind),

    /// Wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
