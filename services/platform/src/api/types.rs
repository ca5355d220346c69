//! HTTP API request/response types.
//!
//! # Purpose
//! Defines the payload shapes of the campus REST API and its OpenAPI schema.
//! Field names are camelCase on the wire; `_count` blocks keep the names the
//! dashboards already read.
use crate::model::{
    Assessment, AssessmentCounts, AttemptWithAssessment, CollegeAdminView, CollegeSummary,
    PlatformAdminView, Progress, Question, QuestionView, StudentActivityCounts, StudentView,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

// ---- authentication ----

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub college_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Account summary returned next to a freshly minted token.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<CollegeSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: AuthUser,
}

// ---- platform administration ----

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollegeRequest {
    pub name: String,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct CreateCollegeResponse {
    pub message: String,
    pub college: CollegeSummary,
}

/// Body for creating a platform admin or a college admin.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct CreateAccountRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SuperAdminCreatedResponse {
    pub message: String,
    pub super_admin: PlatformAdminView,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AdminCreatedResponse {
    pub message: String,
    pub admin: CollegeAdminView,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_colleges: u64,
    pub total_super_admins: u64,
    pub total_students: u64,
    pub total_assessments: u64,
    pub total_attempts: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CollegeStats {
    pub total_students: u64,
    pub total_assessments: u64,
    pub total_attempts: u64,
}

// ---- students ----

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct StudentRosterEntry {
    #[serde(flatten)]
    pub student: StudentView,
    #[serde(rename = "_count")]
    pub count: StudentActivityCounts,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct StudentSummary {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgressReport {
    pub student: StudentSummary,
    pub dsa_progress: Vec<Progress>,
    pub assessment_attempts: Vec<AttemptWithAssessment>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOverview {
    pub dsa_progress: Vec<Progress>,
    pub assessment_attempts: Vec<AttemptWithAssessment>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub college: Option<CollegeSummary>,
}

// ---- assessments ----

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    #[serde(default)]
    pub points: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssessmentRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionInput>,
    #[serde(default)]
    pub college_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default)]
pub struct UpdateAssessmentRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AssessmentListEntry {
    #[serde(flatten)]
    pub assessment: Assessment,
    #[serde(rename = "_count")]
    pub count: AssessmentCounts,
}

/// Assessment as served to a student: questions without the answer key.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AssessmentForStudent {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AssessmentWithQuestions {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AttemptRequest {
    /// Question id to chosen letter; `""` marks a skipped question.
    #[schema(value_type = Object)]
    pub answers: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResponse {
    pub message: String,
    pub attempt: AttemptWithAssessment,
    pub score: u32,
    pub total_points: u32,
    pub percentage: u32,
}

// ---- progress ----

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ProgressRequest {
    pub topic: String,
    pub status: String,
    #[serde(default)]
    pub progress: Option<i64>,
}
