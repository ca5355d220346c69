//! Campus data model.
//!
//! # Purpose
//! Re-exports the tenant, account, assessment and progress records shared by
//! the store and HTTP layers, plus the public views that strip credential
//! material before anything is serialized.
mod account;
mod assessment;
mod college;
mod progress;

pub use account::{
    CollegeAdmin, CollegeAdminView, PlatformAdmin, PlatformAdminView, Student,
    StudentActivityCounts, StudentView,
};
pub use assessment::{
    AnswerLetter, Assessment, AssessmentCounts, AssessmentRef, AssessmentUpdate, Attempt,
    AttemptWithAssessment, Question, QuestionView,
};
pub use college::{College, CollegeSummary};
pub use progress::{Progress, ProgressUpdate, TopicStatus};

/// Fresh opaque identifier for a new row.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
