//! FAQ domain models.

use serde::{Deserialize, Serialize};

use super::ids::FaqId;

/// A stored question and its canned answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub id: FaqId,
    pub question: String,
    pub answer: String,
}
