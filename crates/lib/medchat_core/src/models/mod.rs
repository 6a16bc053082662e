//! Domain models shared by the stores and the HTTP layer.

pub mod auth;
pub mod conversation;
pub mod faq;
pub mod ids;

pub use auth::{AccessClaims, NewUser, RefreshClaims, RefreshTokenRecord, User, UserWithPassword};
pub use conversation::{Conversation, Message, Sender};
pub use faq::FaqEntry;
pub use ids::{ConversationId, FaqId, UserId};
