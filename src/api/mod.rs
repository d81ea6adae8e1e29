pub(crate) mod answers;
pub(crate) mod auth;
pub(crate) mod errors;
pub(crate) mod exams;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod materials;
pub(crate) mod questions;
pub(crate) mod router;
pub(crate) mod sections;
pub(crate) mod users;
pub(crate) mod validation;
