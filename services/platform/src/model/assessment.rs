//! Assessments, their questions and submitted attempts.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl AnswerLetter {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerLetter::A => "A",
            AnswerLetter::B => "B",
            AnswerLetter::C => "C",
            AnswerLetter::D => "D",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "A" => Some(AnswerLetter::A),
            "B" => Some(AnswerLetter::B),
            "C" => Some(AnswerLetter::C),
            "D" => Some(AnswerLetter::D),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub college_id: String,
    pub created_at: DateTime<Utc>,
}

/// Partial edit; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct AssessmentUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Full question record, answer key included. Only admins ever see this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub assessment_id: String,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: AnswerLetter,
    pub points: u32,
}

/// Question as served to students: no answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: String,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub points: u32,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            question: question.question.clone(),
            option_a: question.option_a.clone(),
            option_b: question.option_b.clone(),
            option_c: question.option_c.clone(),
            option_d: question.option_d.clone(),
            points: question.points,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssessmentCounts {
    pub questions: u64,
    pub attempts: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssessmentRef {
    pub id: String,
    pub title: String,
}

/// Immutable record of one submission. `total_points` is frozen at
/// submission time and does not follow later question edits. `answers` is
/// stored as submitted, blanks and stray letters included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub id: String,
    pub student_id: String,
    pub assessment_id: String,
    pub score: u32,
    pub total_points: u32,
    pub answers: BTreeMap<String, String>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttemptWithAssessment {
    #[serde(flatten)]
    pub attempt: Attempt,
    pub assessment: Option<AssessmentRef>,
}
