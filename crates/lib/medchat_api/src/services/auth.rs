//! Authentication service: signup/login/refresh/logout flows over the
//! credential and session stores.

use chrono::Utc;
use medchat_core::auth::jwt::{
    ACCESS_TOKEN_EXPIRY_SECS, generate_access_token, generate_refresh_token, verify_refresh_token,
};
use medchat_core::auth::password::{hash_password_blocking, verify_password_blocking};
use medchat_core::auth::refresh::{hash_refresh_token, new_record};
use medchat_core::models::{NewUser, User};
use medchat_core::store::{CredentialStore, SessionStore};
use medchat_core::validation::{normalize_email, validate_registration};
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};
use crate::models::{LogoutResponse, RefreshResponse, TokenResponse};

/// Same message whether the email or the password was wrong.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Register a new account. Returns the stored user without any password data.
pub async fn register(
    credentials: &dyn CredentialStore,
    name: &str,
    family_name: &str,
    email: &str,
    password: &str,
) -> AppResult<User> {
    let input = validate_registration(name, family_name, email, password)?;

    let password_hash = hash_password_blocking(input.password).await?;

    // The store's unique constraint decides duplicates; no pre-check.
    let user = credentials
        .create_user(NewUser {
            name: input.name,
            family_name: input.family_name,
            email: input.email,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Authenticate with email + password and open a new session.
pub async fn login(
    credentials: &dyn CredentialStore,
    sessions: &dyn SessionStore,
    config: &ApiConfig,
    email: &str,
    password: &str,
) -> AppResult<TokenResponse> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".into(),
        ));
    }

    let account = credentials
        .find_user_by_email(&normalize_email(email))
        .await?;

    let (user, hash) = match account {
        Some(a) => (Some(a.user), Some(a.password_hash)),
        None => (None, None),
    };

    // Unknown emails still pay for a bcrypt comparison.
    let verified = verify_password_blocking(password.to_string(), hash).await?;
    let user = match user {
        Some(user) if verified => user,
        _ => return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into())),
    };

    let now = Utc::now();
    let access_token =
        generate_access_token(&user, config.access_token_secret.as_bytes(), now)?;
    let (refresh_token, _) = generate_refresh_token(
        user.id,
        &user.email,
        config.refresh_token_secret.as_bytes(),
        now,
    )?;

    sessions
        .store_refresh_token(new_record(&refresh_token, user.id, now))
        .await?;

    info!(user_id = %user.id, "user logged in");
    Ok(TokenResponse {
        success: true,
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: ACCESS_TOKEN_EXPIRY_SECS,
        user,
    })
}

/// Exchange a live refresh token for a fresh access token.
///
/// The signature check is the fast path; the persisted record is what
/// makes a logged-out token unusable.
pub async fn refresh(
    credentials: &dyn CredentialStore,
    sessions: &dyn SessionStore,
    config: &ApiConfig,
    refresh_token: &str,
) -> AppResult<RefreshResponse> {
    if refresh_token.is_empty() {
        return Err(AppError::Validation("Refresh token is required".into()));
    }

    let claims = verify_refresh_token(refresh_token, config.refresh_token_secret.as_bytes())
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;

    let now = Utc::now();
    let record = sessions
        .find_refresh_token(&hash_refresh_token(refresh_token), now)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;

    if record.user_id != claims.sub {
        return Err(AppError::Unauthorized("Invalid refresh token".into()));
    }

    let user = credentials
        .find_user_by_id(&record.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    let access_token =
        generate_access_token(&user, config.access_token_secret.as_bytes(), now)?;

    debug!(user_id = %user.id, "access token refreshed");
    Ok(RefreshResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: ACCESS_TOKEN_EXPIRY_SECS,
    })
}

/// Logout: revoke a specific refresh token. Idempotent.
pub async fn logout(sessions: &dyn SessionStore, refresh_token: &str) -> AppResult<LogoutResponse> {
    if refresh_token.is_empty() {
        return Err(AppError::Validation("Refresh token is required".into()));
    }

    let removed = sessions
        .delete_refresh_token(&hash_refresh_token(refresh_token))
        .await?;
    info!(removed, "logout");

    Ok(LogoutResponse {
        success: true,
        message: "Logged out".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use medchat_core::auth::jwt::verify_access_token;
    use medchat_core::store::{MemoryCredentialStore, MemorySessionStore};

    use super::*;

    fn config() -> ApiConfig {
        ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            database_url: String::new(),
            access_token_secret: "access-secret".into(),
            refresh_token_secret: "refresh-secret".into(),
        }
    }

    async fn jean(credentials: &MemoryCredentialStore) -> User {
        register(credentials, "Jean", "Dupont", "jean@x.com", "Abcd1234!")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn register_then_login() {
        let credentials = MemoryCredentialStore::new();
        let sessions = MemorySessionStore::new();
        let user = jean(&credentials).await;
        assert_eq!(user.email, "jean@x.com");

        let tokens = login(&credentials, &sessions, &config(), "Jean@X.com", "Abcd1234!")
            .await
            .unwrap();
        assert!(tokens.success);
        assert!(!tokens.access_token.is_empty());
        assert!(!tokens.refresh_token.is_empty());
        assert_eq!(sessions.len(), 1);

        let claims = verify_access_token(&tokens.access_token, b"access-secret").unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.family_name, "Dupont");
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict_in_any_case() {
        let credentials = MemoryCredentialStore::new();
        jean(&credentials).await;
        let err = register(&credentials, "Jean", "Dupont", "JEAN@x.COM", "Abcd1234!")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn invalid_registration_is_rejected_before_storage() {
        let credentials = MemoryCredentialStore::new();
        let err = register(&credentials, "Jean", "Dupont", "jean@x.com", "short")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(
            credentials
                .find_user_by_email("jean@x.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let credentials = MemoryCredentialStore::new();
        let sessions = MemorySessionStore::new();
        jean(&credentials).await;

        let wrong = login(&credentials, &sessions, &config(), "jean@x.com", "Wrong123!")
            .await
            .unwrap_err();
        let unknown = login(&credentials, &sessions, &config(), "nobody@x.com", "Abcd1234!")
            .await
            .unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, AppError::Unauthorized(_)));
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let credentials = MemoryCredentialStore::new();
        let sessions = MemorySessionStore::new();
        let err = login(&credentials, &sessions, &config(), "", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn each_login_opens_its_own_session() {
        let credentials = MemoryCredentialStore::new();
        let sessions = MemorySessionStore::new();
        jean(&credentials).await;
        let a = login(&credentials, &sessions, &config(), "jean@x.com", "Abcd1234!")
            .await
            .unwrap();
        let b = login(&credentials, &sessions, &config(), "jean@x.com", "Abcd1234!")
            .await
            .unwrap();
        assert_ne!(a.refresh_token, b.refresh_token);
        assert_eq!(sessions.len(), 2);

        logout(&sessions, &a.refresh_token).await.unwrap();
        assert!(
            refresh(&credentials, &sessions, &config(), &b.refresh_token)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn logout_is_idempotent_and_revokes_refresh() {
        let credentials = MemoryCredentialStore::new();
        let sessions = MemorySessionStore::new();
        jean(&credentials).await;
        let tokens = login(&credentials, &sessions, &config(), "jean@x.com", "Abcd1234!")
            .await
            .unwrap();

        let refreshed = refresh(&credentials, &sessions, &config(), &tokens.refresh_token)
            .await
            .unwrap();
        assert!(verify_access_token(&refreshed.access_token, b"access-secret").is_some());

        assert!(logout(&sessions, &tokens.refresh_token).await.unwrap().success);
        assert!(logout(&sessions, &tokens.refresh_token).await.unwrap().success);
        assert!(sessions.is_empty());

        let err = refresh(&credentials, &sessions, &config(), &tokens.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn logout_requires_a_token() {
        let sessions = MemorySessionStore::new();
        assert!(matches!(
            logout(&sessions, "").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn access_token_cannot_be_used_to_refresh() {
        let credentials = MemoryCredentialStore::new();
        let sessions = MemorySessionStore::new();
        jean(&credentials).await;
        let tokens = login(&credentials, &sessions, &config(), "jean@x.com", "Abcd1234!")
            .await
            .unwrap();
        let err = refresh(&credentials, &sessions, &config(), &tokens.access_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
