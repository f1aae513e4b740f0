//! Bearer token issuance and verification.
//!
//! Users and admins get HS256 tokens signed with *separate* secrets, so a
//! user token can never authorize an admin route even if the role claim were
//! forged. Tokens carry no server-side state; logout is client-side token
//! disposal.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use coursehaven_core::{AdminId, UserId};

/// Token verification failure. Deliberately carries no detail; the client
/// message is always the same.
#[derive(Debug, Error)]
#[error("invalid token")]
pub struct TokenError;

/// The audience a token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TokenRole {
    User,
    Admin,
}

/// JWT claims: subject ID, role, and the standard time fields.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i32,
    role: TokenRole,
    iat: i64,
    exp: i64,
}

/// Issues and verifies bearer tokens for both account kinds.
pub struct TokenService {
    user_encoding: EncodingKey,
    user_decoding: DecodingKey,
    admin_encoding: EncodingKey,
    admin_decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenService {
    /// Build a token service from the two signing secrets.
    #[must_use]
    pub fn new(user_secret: &SecretString, admin_secret: &SecretString, ttl_secs: u64) -> Self {
        let user_bytes = user_secret.expose_secret().as_bytes();
        let admin_bytes = admin_secret.expose_secret().as_bytes();

        Self {
            user_encoding: EncodingKey::from_secret(user_bytes),
            user_decoding: DecodingKey::from_secret(user_bytes),
            admin_encoding: EncodingKey::from_secret(admin_bytes),
            admin_decoding: DecodingKey::from_secret(admin_bytes),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Issue a token for a user session.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] if signing fails.
    pub fn issue_user(&self, id: UserId) -> Result<String, TokenError> {
        self.issue(id.as_i32(), TokenRole::User, &self.user_encoding)
    }

    /// Issue a token for an admin session.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] if signing fails.
    pub fn issue_admin(&self, id: AdminId) -> Result<String, TokenError> {
        self.issue(id.as_i32(), TokenRole::Admin, &self.admin_encoding)
    }

    /// Verify a user token and return the user ID it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] if the token is malformed, expired, signed with
    /// the wrong secret, or issued for a different role.
    pub fn verify_user(&self, token: &str) -> Result<UserId, TokenError> {
        let claims = verify(token, &self.user_decoding, TokenRole::User)?;
        Ok(UserId::new(claims.sub))
    }

    /// Verify an admin token and return the admin ID it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] under the same conditions as
    /// [`Self::verify_user`].
    pub fn verify_admin(&self, token: &str) -> Result<AdminId, TokenError> {
        let claims = verify(token, &self.admin_decoding, TokenRole::Admin)?;
        Ok(AdminId::new(claims.sub))
    }

    fn issue(&self, sub: i32, role: TokenRole, key: &EncodingKey) -> Result<String, TokenError> {
        let iat = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub,
            role,
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };

        encode(&Header::default(), &claims, key).map_err(|_| TokenError)
    }
}

fn verify(token: &str, key: &DecodingKey, expected: TokenRole) -> Result<Claims, TokenError> {
    let data =
        decode::<Claims>(token, key, &Validation::new(Algorithm::HS256)).map_err(|_| TokenError)?;

    if data.claims.role != expected {
        return Err(TokenError);
    }

    Ok(data.claims)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(
            &SecretString::from("u".repeat(48)),
            &SecretString::from("a".repeat(48)),
            3600,
        )
    }

    #[test]
    fn test_user_token_roundtrip() {
        let tokens = service();
        let token = tokens.issue_user(UserId::new(12)).unwrap();
        assert_eq!(tokens.verify_user(&token).unwrap(), UserId::new(12));
    }

    #[test]
    fn test_admin_token_roundtrip() {
        let tokens = service();
        let token = tokens.issue_admin(AdminId::new(3)).unwrap();
        assert_eq!(tokens.verify_admin(&token).unwrap(), AdminId::new(3));
    }

    #[test]
    fn test_user_token_rejected_on_admin_routes() {
        let tokens = service();
        let token = tokens.issue_user(UserId::new(12)).unwrap();
        assert!(tokens.verify_admin(&token).is_err());
    }

    #[test]
    fn test_admin_token_rejected_on_user_routes() {
        let tokens = service();
        let token = tokens.issue_admin(AdminId::new(3)).unwrap();
        assert!(tokens.verify_user(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let tokens = service();
        assert!(tokens.verify_user("not-a-jwt").is_err());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let tokens = service();
        let other = TokenService::new(
            &SecretString::from("x".repeat(48)),
            &SecretString::from("y".repeat(48)),
            3600,
        );
        let token = other.issue_user(UserId::new(12)).unwrap();
        assert!(tokens.verify_user(&token).is_err());
    }
}
