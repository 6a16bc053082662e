//! Conversation request handlers. All routes sit behind `require_auth`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use medchat_core::models::{Conversation, ConversationId};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::AppendMessageRequest;
use crate::services::conversations;

/// Ids that do not parse cannot name an existing conversation.
fn parse_id(raw: &str) -> AppResult<ConversationId> {
    raw.parse()
        .map_err(|_| AppError::NotFound("Conversation not found".into()))
}

/// `GET /api/conversations`: the caller's conversations, newest first.
pub async fn list_conversations_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Conversation>>> {
    let items = conversations::list(state.conversations.as_ref(), &user.user_id()).await?;
    Ok(Json(items))
}

/// `POST /api/conversations`: start an empty conversation.
pub async fn create_conversation_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<(StatusCode, Json<Conversation>)> {
    let conversation =
        conversations::create(state.conversations.as_ref(), &user.user_id()).await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

/// `GET /api/conversations/{id}`: one conversation with its messages.
pub async fn get_conversation_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Conversation>> {
    let id = parse_id(&id)?;
    let conversation =
        conversations::get(state.conversations.as_ref(), &user.user_id(), &id).await?;
    Ok(Json(conversation))
}

/// `POST /api/conversations/{id}/message`: append one message.
pub async fn append_message_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<AppendMessageRequest>,
) -> AppResult<Json<Conversation>> {
    let id = parse_id(&id)?;
    let conversation = conversations::append_message(
        state.conversations.as_ref(),
        &user.user_id(),
        &id,
        body.sender,
        &body.text,
    )
    .await?;
    Ok(Json(conversation))
}
