//! JWT token generation and verification.
//!
//! Access and refresh tokens are both HS256 JWTs but are signed with two
//! independent secrets and carry different claim sets, so neither can be
//! passed off as the other.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use uuid::Uuid;

use super::AuthError;
use crate::models::{AccessClaims, RefreshClaims, User, UserId};

/// Access token lifetime: 15 minutes.
pub const ACCESS_TOKEN_EXPIRY_SECS: i64 = 15 * 60;

/// Refresh token lifetime: 7 days.
pub const REFRESH_TOKEN_EXPIRY_SECS: i64 = 7 * 24 * 60 * 60;

/// HS256 with exact expiry (no clock leeway).
fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation
}

/// Generate a signed access token for `user`, issued at `now`.
pub fn generate_access_token(
    user: &User,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<String, AuthError> {
    let claims = AccessClaims {
        sub: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        family_name: user.family_name.clone(),
        exp: (now + Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
}

/// Verify an access token, returning the claims on success.
pub fn verify_access_token(token: &str, secret: &[u8]) -> Option<AccessClaims> {
    let key = DecodingKey::from_secret(secret);
    decode::<AccessClaims>(token, &key, &validation())
        .ok()
        .map(|data| data.claims)
}

/// Generate a signed refresh token, issued at `now`.
pub fn generate_refresh_token(
    user_id: UserId,
    email: &str,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<(String, RefreshClaims), AuthError> {
    let claims = RefreshClaims {
        sub: user_id,
        email: email.to_string(),
        jti: Uuid::new_v4().to_string(),
        exp: (now + Duration::seconds(REFRESH_TOKEN_EXPIRY_SECS)).timestamp(),
        iat: now.timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))?;
    Ok((token, claims))
}

/// Verify a refresh token's signature and expiry.
///
/// This is only the fast path; the persisted record decides whether the
/// token is still live.
pub fn verify_refresh_token(token: &str, secret: &[u8]) -> Option<RefreshClaims> {
    let key = DecodingKey::from_secret(secret);
    decode::<RefreshClaims>(token, &key, &validation())
        .ok()
        .map(|data| data.claims)
}

/// Generate a random 64-character signing secret.
pub fn generate_secret() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
