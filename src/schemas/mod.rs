use std::collections::HashMap;

use serde::Serialize;

pub(crate) mod answer;
pub(crate) mod auth;
pub(crate) mod exam;
pub(crate) mod material;
pub(crate) mod question;
pub(crate) mod section;
pub(crate) mod submission;
pub(crate) mod user;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
}
