//! FAQ request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::models::{AskRequest, AskResponse, CreateFaqRequest, CreateFaqResponse};
use crate::services::faq;

/// `POST /api/faq`: add a question/answer pair.
pub async fn create_faq_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateFaqRequest>,
) -> AppResult<(StatusCode, Json<CreateFaqResponse>)> {
    let entry = faq::add(state.faqs.as_ref(), &body.question, &body.answer).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateFaqResponse {
            message: "FAQ entry added".to_string(),
            faq: entry,
        }),
    ))
}

/// `POST /api/ask`: answer a question from the FAQ.
pub async fn ask_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AskRequest>,
) -> AppResult<Json<AskResponse>> {
    let answer = faq::ask(state.faqs.as_ref(), &body.question).await?;
    Ok(Json(AskResponse { answer }))
}
