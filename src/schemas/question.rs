use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::validation::non_blank;
use crate::core::time::format_primitive;
use crate::db::models::{Answer, Question};
use crate::schemas::answer::AnswerResponse;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[serde(alias = "examId")]
    pub(crate) exam_id: String,
    #[validate(custom(function = non_blank))]
    pub(crate) text: String,
    #[serde(default)]
    #[serde(alias = "isMultipleChoice")]
    pub(crate) is_multiple_choice: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionUpdate {
    #[serde(default)]
    #[validate(custom(function = non_blank))]
    pub(crate) text: Option<String>,
    #[serde(default)]
    #[serde(alias = "isMultipleChoice")]
    pub(crate) is_multiple_choice: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) text: String,
    pub(crate) is_multiple_choice: bool,
    pub(crate) answers: Vec<AnswerResponse>,
    pub(crate) created_at: String,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question, answers: Vec<Answer>) -> Self {
        Self {
            id: question.id,
            exam_id: question.exam_id,
            text: question.text,
            is_multiple_choice: question.is_multiple_choice,
            answers: answers.into_iter().map(AnswerResponse::from_db).collect(),
            created_at: format_primitive(question.created_at),
        }
    }
}
