use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::validation::non_blank;
use crate::core::time::format_primitive;
use crate::db::models::Answer;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AnswerCreate {
    #[serde(alias = "questionId")]
    pub(crate) question_id: String,
    #[validate(custom(function = non_blank))]
    pub(crate) text: String,
    #[serde(default)]
    #[serde(alias = "isCorrect")]
    pub(crate) is_correct: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AnswerUpdate {
    #[serde(default)]
    #[validate(custom(function = non_blank))]
    pub(crate) text: Option<String>,
    #[serde(default)]
    #[serde(alias = "isCorrect")]
    pub(crate) is_correct: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerResponse {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) text: String,
    pub(crate) is_correct: bool,
    pub(crate) created_at: String,
}

impl AnswerResponse {
    pub(crate) fn from_db(answer: Answer) -> Self {
        Self {
            id: answer.id,
            question_id: answer.question_id,
            text: answer.text,
            is_correct: answer.is_correct,
            created_at: format_primitive(answer.created_at),
        }
    }
}
