//! Request handlers.

pub mod auth;
pub mod conversations;
pub mod faq;
pub mod health;
