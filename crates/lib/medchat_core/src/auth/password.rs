//! Password hashing via bcrypt.

use std::sync::LazyLock;

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Hash compared against when the account does not exist, so an unknown
/// email costs the same bcrypt work as a wrong password.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| bcrypt::hash("medchat-dummy-password", BCRYPT_COST).unwrap_or_default());

/// Hash a password with bcrypt (cost 10).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// Burn one bcrypt verification without a real hash. Always "fails".
pub fn verify_against_dummy(password: &str) {
    let _ = bcrypt::verify(password, &DUMMY_HASH);
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Internal(format!("bcrypt task: {e}")))?
}

/// [`verify_password`] on the blocking pool. `None` checks the dummy hash
/// and returns `false`.
pub async fn verify_password_blocking(
    password: String,
    hash: Option<String>,
) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || match hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            verify_against_dummy(&password);
            Ok(false)
        }
    })
    .await
    .map_err(|e| AuthError::Internal(format!("bcrypt task: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifiable() {
        let a = hash_password("Abcd1234!").unwrap();
        let b = hash_password("Abcd1234!").unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("Abcd1234!"));
        assert!(a.starts_with("$2b$10$"));
        assert!(verify_password("Abcd1234!", &a).unwrap());
        assert!(!verify_password("Abcd1234?", &a).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("Abcd1234!", "not-a-hash").is_err());
    }

    #[tokio::test]
    async fn blocking_wrappers() {
        let hash = hash_password_blocking("Abcd1234!".into()).await.unwrap();
        assert!(
            verify_password_blocking("Abcd1234!".into(), Some(hash))
                .await
                .unwrap()
        );
        assert!(
            !verify_password_blocking("Abcd1234!".into(), None)
                .await
                .unwrap()
        );
    }
}
