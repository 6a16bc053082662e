//! PostgreSQL-backed stores.
//!
//! Migrations are embedded from `medchat_core/migrations/`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ConversationStore, CredentialStore, FaqStore, SessionStore, StoreError};
use crate::models::{
    Conversation, ConversationId, FaqEntry, FaqId, Message, NewUser, RefreshTokenRecord, Sender,
    User, UserId, UserWithPassword,
};

/// Run all embedded database migrations against the given pool.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// All four stores over one connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique-constraint violation to [`StoreError::Duplicate`].
fn map_unique(what: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| {
        if let sqlx::Error::Database(db) = &e
            && db.is_unique_violation()
        {
            return StoreError::Duplicate(what);
        }
        StoreError::DbError(e)
    }
}

/// Row returned by user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    family_name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> UserWithPassword {
        UserWithPassword {
            user: User {
                id: UserId::from_uuid(self.id),
                name: self.name,
                family_name: self.family_name,
                email: self.email,
                created_at: self.created_at,
            },
            password_hash: self.password_hash,
        }
    }
}

/// Row returned by refresh token queries.
#[derive(Debug, sqlx::FromRow)]
struct RefreshTokenRow {
    token_hash: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Row returned by conversation queries.
#[derive(Debug, sqlx::FromRow)]
struct ConversationRow {
    id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

/// Row returned by message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    conversation_id: Uuid,
    sender: String,
    text: String,
}

impl MessageRow {
    fn into_message(self) -> Result<Message, StoreError> {
        let sender: Sender = self.sender.parse().map_err(StoreError::Corrupt)?;
        Ok(Message::new(sender, self.text))
    }
}

fn conversation_from_rows(
    row: ConversationRow,
    messages: Vec<MessageRow>,
) -> Result<Conversation, StoreError> {
    Ok(Conversation {
        id: ConversationId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        messages: messages
            .into_iter()
            .map(MessageRow::into_message)
            .collect::<Result<_, _>>()?,
        created_at: row.created_at,
    })
}

impl PgStore {
    /// Load a conversation and its messages, ordered by sort_order.
    async fn load_conversation(&self, id: Uuid) -> Result<Option<Conversation>, StoreError> {
        let row = sqlx::query_as::<_, ConversationRow>(
            "SELECT id, user_id, created_at FROM conversations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let messages = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT conversation_id, sender, text
            FROM messages
            WHERE conversation_id = $1
            ORDER BY sort_order ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        conversation_from_rows(row, messages).map(Some)
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, family_name, email, password_hash)
            VALUES ($1, $2, $3, lower($4), $5)
            RETURNING id, name, family_name, email, password_hash, created_at
            "#,
        )
        .bind(*UserId::new_v7().as_uuid())
        .bind(&new.name)
        .bind(&new.family_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique("email"))?;
        Ok(row.into_user().user)
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithPassword>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, family_name, email, password_hash, created_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserRow::into_user))
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, family_name, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.into_user().user))
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn store_refresh_token(&self, record: RefreshTokenRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO refresh_tokens (token_hash, user_id, created_at, expires_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&record.token_hash)
        .bind(*record.user_id.as_uuid())
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique("refresh token"))?;
        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            "SELECT token_hash, user_id, created_at, expires_at \
             FROM refresh_tokens \
             WHERE token_hash = $1 AND expires_at > $2",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| RefreshTokenRecord {
            token_hash: r.token_hash,
            user_id: UserId::from_uuid(r.user_id),
            created_at: r.created_at,
            expires_at: r.expires_at,
        }))
    }

    async fn delete_refresh_token(&self, token_hash: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ConversationStore for PgStore {
    async fn create_conversation(&self, owner: &UserId) -> Result<Conversation, StoreError> {
        let row = sqlx::query_as::<_, ConversationRow>(
            r#"
            INSERT INTO conversations (id, user_id)
            VALUES ($1, $2)
            RETURNING id, user_id, created_at
            "#,
        )
        .bind(*ConversationId::new_v7().as_uuid())
        .bind(*owner.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        conversation_from_rows(row, Vec::new())
    }

    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, StoreError> {
        self.load_conversation(*id.as_uuid()).await
    }

    async fn append_message(
        &self,
        id: &ConversationId,
        message: Message,
    ) -> Result<Conversation, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes appends to the same conversation.
        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM conversations WHERE id = $1 FOR UPDATE",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound(format!("conversation {id}")));
        }

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, sort_order, sender, text)
            SELECT $1, $2, COALESCE(MAX(sort_order) + 1, 0), $3, $4
            FROM messages
            WHERE conversation_id = $2
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(*id.as_uuid())
        .bind(message.sender.as_str())
        .bind(&message.text)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.load_conversation(*id.as_uuid())
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("conversation {id}")))
    }

    async fn list_conversations(&self, owner: &UserId) -> Result<Vec<Conversation>, StoreError> {
        let rows = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT id, user_id, created_at
            FROM conversations
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(*owner.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let message_rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT conversation_id, sender, text
            FROM messages
            WHERE conversation_id = ANY($1)
            ORDER BY conversation_id, sort_order ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_conversation: HashMap<Uuid, Vec<MessageRow>> = HashMap::new();
        for row in message_rows {
            by_conversation
                .entry(row.conversation_id)
                .or_default()
                .push(row);
        }

        rows.into_iter()
            .map(|row| {
                let messages = by_conversation.remove(&row.id).unwrap_or_default();
                conversation_from_rows(row, messages)
            })
            .collect()
    }
}

#[async_trait]
impl FaqStore for PgStore {
    async fn create_faq(&self, question: &str, answer: &str) -> Result<FaqEntry, StoreError> {
        let id = FaqId::new_v7();
        sqlx::query("INSERT INTO faqs (id, question, answer) VALUES ($1, $2, $3)")
            .bind(*id.as_uuid())
            .bind(question)
            .bind(answer)
            .execute(&self.pool)
            .await?;
        Ok(FaqEntry {
            id,
            question: question.to_string(),
            answer: answer.to_string(),
        })
    }

    async fn list_faqs(&self) -> Result<Vec<FaqEntry>, StoreError> {
        let rows = sqlx::query_as::<_, (Uuid, String, String)>(
            "SELECT id, question, answer FROM faqs ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, question, answer)| FaqEntry {
                id: FaqId::from_uuid(id),
                question,
                answer,
            })
            .collect())
    }
}
