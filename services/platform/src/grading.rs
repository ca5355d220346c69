//! Attempt scoring.
//!
//! Pure functions; the handler persists whatever these return. Unanswered
//! questions, answers keyed by unknown question ids and answers that are not
//! one of `A`..`D` (the web client sends `""` for a skipped question) all
//! score zero.
use crate::model::{AnswerLetter, Question};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub score: u32,
    pub total_points: u32,
}

impl Score {
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total_points)
    }
}

/// `None` when the weighted sum does not fit in `u32`.
pub fn score_attempt(
    questions: &[Question],
    answers: &BTreeMap<String, String>,
) -> Option<Score> {
    questions
        .iter()
        .try_fold(Score { score: 0, total_points: 0 }, |acc, question| {
            let earned = if answered_correctly(answers, question) {
                question.points
            } else {
                0
            };
            Some(Score {
                score: acc.score.checked_add(earned)?,
                total_points: acc.total_points.checked_add(question.points)?,
            })
        })
}

fn answered_correctly(answers: &BTreeMap<String, String>, question: &Question) -> bool {
    answers
        .get(&question.id)
        .and_then(|answer| AnswerLetter::parse(answer))
        == Some(question.correct_answer)
}

/// `round(100 * score / total_points)` with halves rounded up; 0 when there
/// is nothing to score.
pub fn percentage(score: u32, total_points: u32) -> u32 {
    if total_points == 0 {
        return 0;
    }
    let total = u64::from(total_points);
    ((200 * u64::from(score) + total) / (2 * total)) as u32
}
