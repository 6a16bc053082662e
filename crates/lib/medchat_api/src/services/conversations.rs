//! Conversation service: ownership-checked access to the conversation store.
//!
//! A conversation that exists but belongs to someone else is `Forbidden`;
//! an unknown id is `NotFound`. Every read and append goes through
//! [`load_owned`].

use medchat_core::models::{Conversation, ConversationId, Message, Sender, UserId};
use medchat_core::store::ConversationStore;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Fetch a conversation and check that `caller` owns it.
async fn load_owned(
    store: &dyn ConversationStore,
    caller: &UserId,
    id: &ConversationId,
) -> AppResult<Conversation> {
    let conversation = store
        .get_conversation(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Conversation not found".into()))?;

    if !conversation.is_owned_by(caller) {
        debug!(conversation_id = %id, caller = %caller, "ownership check failed");
        return Err(AppError::Forbidden(
            "You do not have access to this conversation".into(),
        ));
    }
    Ok(conversation)
}

/// Start an empty conversation owned by `caller`.
pub async fn create(store: &dyn ConversationStore, caller: &UserId) -> AppResult<Conversation> {
    let conversation = store.create_conversation(caller).await?;
    debug!(conversation_id = %conversation.id, "conversation created");
    Ok(conversation)
}

/// One of the caller's conversations.
pub async fn get(
    store: &dyn ConversationStore,
    caller: &UserId,
    id: &ConversationId,
) -> AppResult<Conversation> {
    load_owned(store, caller, id).await
}

/// Append a message; `sender` defaults to the user.
pub async fn append_message(
    store: &dyn ConversationStore,
    caller: &UserId,
    id: &ConversationId,
    sender: Option<Sender>,
    text: &str,
) -> AppResult<Conversation> {
    load_owned(store, caller, id).await?;

    if text.trim().is_empty() {
        return Err(AppError::Validation("Message text is required".into()));
    }

    let message = Message::new(sender.unwrap_or_default(), text);
    Ok(store.append_message(id, message).await?)
}

/// The caller's conversations, newest first.
pub async fn list(store: &dyn ConversationStore, caller: &UserId) -> AppResult<Vec<Conversation>> {
    Ok(store.list_conversations(caller).await?)
}
