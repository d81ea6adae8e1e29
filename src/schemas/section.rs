use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::validation::non_blank;
use crate::core::time::format_primitive;
use crate::db::models::{Material, Section};
use crate::schemas::material::MaterialResponse;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SectionCreate {
    #[validate(custom(function = non_blank))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[serde(alias = "isPublic")]
    pub(crate) is_public: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SectionUpdate {
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
pub(crate) struct SectionResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) owner_id: String,
    pub(crate) is_public: bool,
    pub(crate) materials: Vec<MaterialResponse>,
    pub(crate) materials_count: usize,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl SectionResponse {
    pub(crate) fn from_db(section: Section, materials: Vec<Material>) -> Self {
        let materials: Vec<MaterialResponse> =
            materials.into_iter().map(MaterialResponse::from_db).collect();
        Self {
            id: section.id,
            title: section.title,
            description: section.description,
            owner_id: section.owner_id,
            is_public: section.is_public,
            materials_count: materials.len(),
            materials,
            created_at: format_primitive(section.created_at),
            updated_at: format_primitive(section.updated_at),
        }
    }
}
