//! Authentication primitives.
//!
//! Password hashing, JWT minting/verification and refresh-token hashing.
//! The flows that combine them with the stores live in `medchat_api`.

pub mod jwt;
pub mod password;
pub mod refresh;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
