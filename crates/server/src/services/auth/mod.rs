//! Authentication service.
//!
//! Signup and login for customers and admins, plus the bearer-token
//! machinery in [`tokens`]. Passwords are hashed with Argon2id; signup
//! validation collects every failing field so clients can render per-field
//! messages in one round trip.

mod error;
pub mod tokens;

pub use error::{AccountKind, AuthError};
pub use tokens::{TokenError, TokenService};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use coursehaven_core::Email;

use crate::db::{NewAccount, Store, StoreError};
use crate::error::FieldError;
use crate::models::{Admin, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;
/// Minimum length of first/last name after trimming.
const MIN_NAME_LENGTH: usize = 2;

/// Raw signup fields as they arrived on the wire.
///
/// Fields are optional so validation can report "missing" and "too short"
/// with the same per-field message instead of failing deserialization.
#[derive(Debug, Clone, Copy)]
pub struct Signup<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
}

/// Authentication service.
///
/// Handles account registration and password login for both account kinds.
pub struct AuthService<'a> {
    store: &'a dyn Store,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with per-field messages if any field
    /// is malformed, or `AuthError::AccountExists` if the email is taken.
    pub async fn register_user(&self, signup: Signup<'_>) -> Result<User, AuthError> {
        let account = validate_signup(&signup)?;

        self.store.create_user(account).await.map_err(|e| match e {
            StoreError::EmailTaken => AuthError::AccountExists(AccountKind::User),
            other => AuthError::Store(other),
        })
    }

    /// Log a customer in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UnknownAccount` if no user has this email and
    /// `AuthError::InvalidCredentials` if the password is wrong.
    pub async fn login_user(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email =
            Email::parse(email).map_err(|_| AuthError::UnknownAccount(AccountKind::User))?;

        let user = self
            .store
            .user_by_email(&email)
            .await?
            .ok_or(AuthError::UnknownAccount(AccountKind::User))?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }

    /// Register a new admin account.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::register_user`].
    pub async fn register_admin(&self, signup: Signup<'_>) -> Result<Admin, AuthError> {
        let account = validate_signup(&signup)?;

        self.store.create_admin(account).await.map_err(|e| match e {
            StoreError::EmailTaken => AuthError::AccountExists(AccountKind::Admin),
            other => AuthError::Store(other),
        })
    }

    /// Log an admin in with email and password.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::login_user`].
    pub async fn login_admin(&self, email: &str, password: &str) -> Result<Admin, AuthError> {
        let email =
            Email::parse(email).map_err(|_| AuthError::UnknownAccount(AccountKind::Admin))?;

        let admin = self
            .store
            .admin_by_email(&email)
            .await?
            .ok_or(AuthError::UnknownAccount(AccountKind::Admin))?;

        verify_password(password, &admin.password_hash)?;

        Ok(admin)
    }
}

/// Validate all signup fields, collecting every failure.
fn validate_signup(signup: &Signup<'_>) -> Result<NewAccount, AuthError> {
    let mut errors = Vec::new();

    let first_name = signup.first_name.map(str::trim).unwrap_or_default();
    if first_name.len() < MIN_NAME_LENGTH {
        errors.push(FieldError::new(
            "firstName",
            format!("First name must be at least {MIN_NAME_LENGTH} characters"),
        ));
    }

    let last_name = signup.last_name.map(str::trim).unwrap_or_default();
    if last_name.len() < MIN_NAME_LENGTH {
        errors.push(FieldError::new(
            "lastName",
            format!("Last name must be at least {MIN_NAME_LENGTH} characters"),
        ));
    }

    let email = match Email::parse(signup.email.unwrap_or_default()) {
        Ok(email) => Some(email),
        Err(_) => {
            errors.push(FieldError::new("email", "Invalid email"));
            None
        }
    };

    let password = signup.password.unwrap_or_default();
    if password.len() < MIN_PASSWORD_LENGTH {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }

    match email {
        Some(email) if errors.is_empty() => {
            // Hash only after validation has fully passed.
            let password_hash = hash_password(password)?;

            Ok(NewAccount {
                first_name: first_name.to_owned(),
                last_name: last_name.to_owned(),
                email,
                password_hash,
            })
        }
        _ => Err(AuthError::Validation(errors)),
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|e| match e {
            argon2::password_hash::Error::Password => AuthError::InvalidCredentials,
            _ => AuthError::PasswordHash,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    const SIGNUP: Signup<'static> = Signup {
        first_name: Some("Ada"),
        last_name: Some("Lovelace"),
        email: Some("Ada@Example.com"),
        password: Some("correct horse"),
    };

    #[tokio::test]
    async fn test_register_and_login_user() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let user = auth.register_user(SIGNUP).await.unwrap();
        assert_eq!(user.email.as_str(), "ada@example.com");
        assert_ne!(user.password_hash, "correct horse");

        let logged_in = auth
            .login_user("ada@example.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        auth.register_user(SIGNUP).await.unwrap();
        let err = auth.register_user(SIGNUP).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountExists(AccountKind::User)));
    }

    #[tokio::test]
    async fn test_user_and_admin_emails_independent() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        auth.register_user(SIGNUP).await.unwrap();
        // Same email is fine in the admin table.
        auth.register_admin(SIGNUP).await.unwrap();
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        auth.register_user(SIGNUP).await.unwrap();
        let err = auth
            .login_user("ada@example.com", "wrong password")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let err = auth
            .login_user("nobody@example.com", "whatever")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnknownAccount(AccountKind::User)));
    }

    #[tokio::test]
    async fn test_validation_collects_all_fields() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let err = auth
            .register_user(Signup {
                first_name: Some("A"),
                last_name: None,
                email: Some("not-an-email"),
                password: Some("short"),
            })
            .await
            .unwrap_err();

        let AuthError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        let names: Vec<&str> = fields.iter().map(|f| f.field).collect();
        assert_eq!(names, ["firstName", "lastName", "email", "password"]);
    }

    #[tokio::test]
    async fn test_names_are_trimmed() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let user = auth
            .register_user(Signup {
                first_name: Some("  Ada  "),
                last_name: Some(" Lovelace "),
                email: Some("ada@example.com"),
                password: Some("correct horse"),
            })
            .await
            .unwrap();
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.last_name, "Lovelace");
    }
}
