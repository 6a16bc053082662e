//! # medchat_core
//!
//! Core domain logic for MedChat: models, validation, password and token
//! primitives, FAQ matching and the persistence seams.

pub mod auth;
pub mod faq;
pub mod models;
pub mod store;
pub mod validation;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
