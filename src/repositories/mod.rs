pub(crate) mod answers;
pub(crate) mod exams;
pub(crate) mod materials;
pub(crate) mod questions;
pub(crate) mod sections;
pub(crate) mod users;
