//! In-memory stores backed by `DashMap`.
//!
//! Used by tests and by the server's `--in-memory` mode. Contents live as
//! long as the process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::RwLock;

use super::{ConversationStore, CredentialStore, FaqStore, SessionStore, StoreError};
use crate::models::{
    Conversation, ConversationId, FaqEntry, FaqId, Message, NewUser, RefreshTokenRecord, User,
    UserId, UserWithPassword,
};

/// Users keyed by lowercased email; the map entry is the uniqueness constraint.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    by_email: DashMap<String, UserWithPassword>,
    email_by_id: DashMap<UserId, String>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let key = new.email.to_lowercase();
        match self.by_email.entry(key.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate("email")),
            Entry::Vacant(slot) => {
                let user = User {
                    id: UserId::new_v7(),
                    name: new.name,
                    family_name: new.family_name,
                    email: key.clone(),
                    created_at: Utc::now(),
                };
                slot.insert(UserWithPassword {
                    user: user.clone(),
                    password_hash: new.password_hash,
                });
                self.email_by_id.insert(user.id, key);
                Ok(user)
            }
        }
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithPassword>, StoreError> {
        Ok(self
            .by_email
            .get(&email.to_lowercase())
            .map(|entry| entry.value().clone()))
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let Some(email) = self.email_by_id.get(id).map(|e| e.value().clone()) else {
            return Ok(None);
        };
        Ok(self.by_email.get(&email).map(|entry| entry.user.clone()))
    }
}

/// Refresh-token records keyed by token hash.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: DashMap<String, RefreshTokenRecord>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held, expired ones included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn store_refresh_token(&self, record: RefreshTokenRecord) -> Result<(), StoreError> {
        match self.records.entry(record.token_hash.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate("refresh token")),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        Ok(self
            .records
            .get(token_hash)
            .filter(|record| !record.is_expired_at(now))
            .map(|record| record.value().clone()))
    }

    async fn delete_refresh_token(&self, token_hash: &str) -> Result<bool, StoreError> {
        Ok(self.records.remove(token_hash).is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let expired: Vec<String> = self
            .records
            .iter()
            .filter(|record| record.is_expired_at(now))
            .map(|record| record.key().clone())
            .collect();
        let mut purged = 0;
        for key in expired {
            if self
                .records
                .remove_if(&key, |_, record| record.is_expired_at(now))
                .is_some()
            {
                purged += 1;
            }
        }
        Ok(purged)
    }
}

/// Conversations keyed by id.
#[derive(Debug, Default)]
pub struct MemoryConversationStore {
    conversations: DashMap<ConversationId, Conversation>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn create_conversation(&self, owner: &UserId) -> Result<Conversation, StoreError> {
        let conversation = Conversation::new(*owner);
        self.conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, StoreError> {
        Ok(self.conversations.get(id).map(|c| c.value().clone()))
    }

    async fn append_message(
        &self,
        id: &ConversationId,
        message: Message,
    ) -> Result<Conversation, StoreError> {
        // The shard write lock makes the push atomic per conversation.
        let mut conversation = self
            .conversations
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("conversation {id}")))?;
        conversation.messages.push(message);
        Ok(conversation.value().clone())
    }

    async fn list_conversations(&self, owner: &UserId) -> Result<Vec<Conversation>, StoreError> {
        let mut owned: Vec<Conversation> = self
            .conversations
            .iter()
            .filter(|c| c.is_owned_by(owner))
            .map(|c| c.value().clone())
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }
}

/// FAQ entries in insertion order.
#[derive(Debug, Default)]
pub struct MemoryFaqStore {
    entries: RwLock<Vec<FaqEntry>>,
}

impl MemoryFaqStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FaqStore for MemoryFaqStore {
    async fn create_faq(&self, question: &str, answer: &str) -> Result<FaqEntry, StoreError> {
        let entry = FaqEntry {
            id: FaqId::new_v7(),
            question: question.to_string(),
            answer: answer.to_string(),
        };
        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn list_faqs(&self) -> Result<Vec<FaqEntry>, StoreError> {
        Ok(self.entries.read().await.clone())
    }
}
