//! Persistence seams.
//!
//! Each store is a trait so the HTTP layer can run against PostgreSQL in
//! production and against in-memory maps in tests. Every write touches a
//! single record and is atomic on its own.

pub mod memory;
pub mod postgres;
pub mod sweeper;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    Conversation, ConversationId, FaqEntry, Message, NewUser, RefreshTokenRecord, User, UserId,
    UserWithPassword,
};

pub use memory::{MemoryConversationStore, MemoryCredentialStore, MemoryFaqStore, MemorySessionStore};
pub use postgres::PgStore;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("Duplicate {0}")]
    Duplicate(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// User identity records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user. Fails with [`StoreError::Duplicate`] if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Look up a user by normalized email.
    async fn find_user_by_email(&self, email: &str)
    -> Result<Option<UserWithPassword>, StoreError>;

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;
}

/// Refresh-token records.
///
/// Lookups treat a record whose `expires_at` has passed as absent, whether
/// or not it has been purged yet.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn store_refresh_token(&self, record: RefreshTokenRecord) -> Result<(), StoreError>;

    /// Find a live record by token hash.
    async fn find_refresh_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Delete a record by token hash. Returns whether a record was removed.
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<bool, StoreError>;

    /// Remove every record expired at `now`. Returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// Conversations and their transcripts.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create_conversation(&self, owner: &UserId) -> Result<Conversation, StoreError>;

    async fn get_conversation(&self, id: &ConversationId)
    -> Result<Option<Conversation>, StoreError>;

    /// Append one message and return the updated conversation.
    /// Fails with [`StoreError::NotFound`] if the conversation is gone.
    async fn append_message(
        &self,
        id: &ConversationId,
        message: Message,
    ) -> Result<Conversation, StoreError>;

    /// All conversations owned by `owner`, newest first.
    async fn list_conversations(&self, owner: &UserId) -> Result<Vec<Conversation>, StoreError>;
}

/// Question/answer pairs.
#[async_trait]
pub trait FaqStore: Send + Sync {
    async fn create_faq(&self, question: &str, answer: &str) -> Result<FaqEntry, StoreError>;

    /// All entries in insertion order.
    async fn list_faqs(&self) -> Result<Vec<FaqEntry>, StoreError>;
}
