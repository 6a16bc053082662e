//! FAQ service: storing entries and answering questions.

use medchat_core::faq::answer_for;
use medchat_core::models::FaqEntry;
use medchat_core::store::FaqStore;
use tracing::info;

use crate::error::{AppError, AppResult};

/// Store a question/answer pair. Both must be non-blank.
pub async fn add(store: &dyn FaqStore, question: &str, answer: &str) -> AppResult<FaqEntry> {
    let question = question.trim();
    let answer = answer.trim();
    if question.is_empty() || answer.is_empty() {
        return Err(AppError::Validation(
            "Question and answer are required".into(),
        ));
    }
    let entry = store.create_faq(question, answer).await?;
    info!(faq_id = %entry.id, "faq entry added");
    Ok(entry)
}

/// Answer `question` from the stored entries, or the fallback answer.
pub async fn ask(store: &dyn FaqStore, question: &str) -> AppResult<String> {
    let entries = store.list_faqs().await?;
    Ok(answer_for(&entries, question))
}
