use std::collections::HashMap;

use thiserror::Error;

use crate::repositories::questions::ScoringKey;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ScoringError {
    #[error("Exam has no questions")]
    NoQuestions,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SubmissionScore {
    pub(crate) score: f64,
    pub(crate) correct_answers: u32,
    pub(crate) total_questions: u32,
}

/// Grades a submission against the exam's questions. A question counts as
/// correct when the submitted answer id matches the question's first correct
/// answer; questions with no correct answer never score.
pub(crate) fn score_submission(
    keys: &[ScoringKey],
    submitted: &HashMap<String, String>,
) -> Result<SubmissionScore, ScoringError> {
    if keys.is_empty() {
        return Err(ScoringError::NoQuestions);
    }

    let total_questions = keys.len() as u32;
    let mut correct_answers = 0u32;

    for key in keys {
        let Some(correct_answer_id) = &key.correct_answer_id else {
            continue;
        };
        if submitted.get(&key.question_id) == Some(correct_answer_id) {
            correct_answers += 1;
        }
    }

    let score = f64::from(correct_answers) / f64::from(total_questions) * 100.0;

    Ok(SubmissionScore { score, correct_answers, total_questions })
}
