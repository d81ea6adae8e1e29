use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::validation::non_blank;
use crate::core::time::format_primitive;
use crate::db::models::Exam;
use crate::schemas::question::QuestionResponse;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamCreate {
    #[serde(alias = "materialId")]
    pub(crate) material_id: String,
    #[validate(custom(function = non_blank))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[serde(alias = "isPublic")]
    pub(crate) is_public: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamUpdate {
    #[serde(default)]
    #[validate(custom(function = non_blank))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[serde(alias = "isPublic")]
    pub(crate) is_public: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) material_id: String,
    pub(crate) owner_id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) is_public: bool,
    pub(crate) questions: Vec<QuestionResponse>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ExamResponse {
    pub(crate) fn from_db(exam: Exam, questions: Vec<QuestionResponse>) -> Self {
        Self {
            id: exam.id,
            material_id: exam.material_id,
            owner_id: exam.owner_id,
            title: exam.title,
            description: exam.description,
            is_public: exam.is_public,
            questions,
            created_at: format_primitive(exam.created_at),
            updated_at: format_primitive(exam.updated_at),
        }
    }
}
