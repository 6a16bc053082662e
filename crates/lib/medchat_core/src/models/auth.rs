//! Authentication domain models.
//!
//! These are internal domain models, distinct from the API request/response
//! shapes in `medchat_api::models`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// Domain user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub family_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// User with password hash (for internal auth flows).
#[derive(Debug, Clone)]
pub struct UserWithPassword {
    pub user: User,
    pub password_hash: String,
}

/// A validated account ready to be persisted.
///
/// `email` is already normalized (trimmed, lowercased) and `password_hash`
/// is a bcrypt hash.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub family_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Refresh token record stored in the session store.
///
/// The token itself is never stored; `token_hash` is its SHA-256 hex digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Whether the record can no longer be used at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    /// Subject: user ID (standard JWT `sub` claim).
    pub sub: UserId,
    pub email: String,
    pub name: String,
    pub family_name: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

/// JWT claims embedded in refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: UserId,
    pub email: String,
    /// Unique token id; two logins in the same second still get distinct tokens.
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}
