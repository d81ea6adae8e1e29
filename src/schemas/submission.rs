use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::services::scoring::SubmissionScore;

/// Submitted answers keyed by question id, each value an answer id.
#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionRequest {
    pub(crate) answers: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
    pub(crate) score: f64,
    pub(crate) correct_answers: u32,
    pub(crate) total_questions: u32,
}

impl SubmissionResponse {
    pub(crate) fn from_score(score: SubmissionScore) -> Self {
        Self {
            score: score.score,
            correct_answers: score.correct_answers,
            total_questions: score.total_questions,
        }
    }
}
