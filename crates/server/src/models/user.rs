//! Account domain types.
//!
//! Customers and admins live in separate tables and authenticate against
//! separate token audiences; the two types are kept distinct so an admin ID
//! can never be used where a customer ID is expected.

use chrono::{DateTime, Utc};

use coursehaven_core::{AdminId, Email, UserId};

/// A marketplace customer (domain type).
#[derive(Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Normalized (lowercased) email address, unique across users.
    pub email: Email,
    /// Argon2 password hash. Never serialized to clients.
    pub password_hash: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A marketplace administrator (domain type).
///
/// Admins create and manage courses; each course records its creating admin
/// and only that admin may modify it.
#[derive(Clone)]
pub struct Admin {
    /// Unique admin ID.
    pub id: AdminId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Normalized (lowercased) email address, unique across admins.
    pub email: Email,
    /// Argon2 password hash. Never serialized to clients.
    pub password_hash: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

// Manual Debug impls keep password hashes out of logs.
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl std::fmt::Debug for Admin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admin")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password_hash() {
        let user = User {
            id: UserId::new(1),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            password_hash: "$argon2id$v=19$super-secret-hash".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let debug_output = format!("{user:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-hash"));
    }
}
