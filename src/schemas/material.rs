use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::validation::non_blank;
use crate::core::time::format_primitive;
use crate::db::models::Material;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct MaterialCreate {
    #[serde(alias = "sectionId")]
    pub(crate) section_id: String,
    #[validate(custom(function = non_blank))]
    pub(crate) title: String,
    #[validate(custom(function = non_blank))]
    pub(crate) content: String,
    #[serde(default)]
    #[serde(alias = "isPublic")]
    pub(crate) is_public: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct MaterialUpdate {
    #[serde(default)]
    #[validate(custom(function = non_blank))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    #[validate(custom(function = non_blank))]
    pub(crate) content: Option<String>,
    #[serde(default)]
    #[serde(alias = "isPublic")]
    pub(crate) is_public: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MaterialResponse {
    pub(crate) id: String,
    pub(crate) section_id: String,
    pub(crate) owner_id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) is_public: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl MaterialResponse {
    pub(crate) fn from_db(material: Material) -> Self {
        Self {
            id: material.id,
            section_id: material.section_id,
            owner_id: material.owner_id,
            title: material.title,
            content: material.content,
            is_public: material.is_public,
            created_at: format_primitive(material.created_at),
            updated_at: format_primitive(material.updated_at),
        }
    }
}
