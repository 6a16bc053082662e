//! Refresh-token records.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use super::jwt::REFRESH_TOKEN_EXPIRY_SECS;
use crate::models::{RefreshTokenRecord, UserId};

/// SHA-256 hash a refresh token for storage.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Build the record persisted for a token issued at `now`.
pub fn new_record(token: &str, user_id: UserId, now: DateTime<Utc>) -> RefreshTokenRecord {
    RefreshTokenRecord {
        token_hash: hash_refresh_token(token),
        user_id,
        created_at: now,
        expires_at: now + Duration::seconds(REFRESH_TOKEN_EXPIRY_SECS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_hex() {
        let h = hash_refresh_token("abc");
        assert_eq!(h.len(), 64);
        assert_eq!(h, hash_refresh_token("abc"));
        assert_ne!(h, hash_refresh_token("abd"));
    }

    #[test]
    fn record_expires_seven_days_after_creation() {
        let now = Utc::now();
        let record = new_record("tok", UserId::new_v7(), now);
        assert_eq!(record.expires_at - record.created_at, Duration::days(7));
        assert!(!record.is_expired_at(now + Duration::days(6)));
        assert!(record.is_expired_at(now + Duration::days(7)));
    }
}
