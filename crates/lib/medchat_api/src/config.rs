//! API server configuration.

use medchat_core::auth::jwt::generate_secret;
use tracing::warn;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:5000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Signs and verifies access tokens.
    pub access_token_secret: String,
    /// Signs and verifies refresh tokens. Must differ from the access secret.
    pub refresh_token_secret: String,
}

impl ApiConfig {
    /// Reject configurations where one secret could forge the other kind of token.
    pub fn validate(&self) -> Result<(), String> {
        if self.access_token_secret.is_empty() || self.refresh_token_secret.is_empty() {
            return Err("token secrets must not be empty".into());
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err("access and refresh token secrets must differ".into());
        }
        Ok(())
    }
}

/// Use `value` if set and non-empty, otherwise generate a per-process secret.
///
/// Tokens signed with a generated secret stop verifying after a restart.
pub fn resolve_secret(name: &str, value: Option<String>) -> String {
    match value {
        Some(secret) if !secret.is_empty() => secret,
        _ => {
            warn!(variable = name, "secret not set, generated one for this process");
            generate_secret()
        }
    }
}
