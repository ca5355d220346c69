//! Storage abstraction for the campus platform.
//!
//! # Purpose
//! Defines the [`CampusStore`] trait implemented by the in-memory and Postgres
//! backends, plus the error type every backend maps its failures into.
//!
//! # Key invariants
//! - Every call that reads or writes tenant-owned rows takes a [`Scope`] and
//!   applies it; rows outside the scope behave exactly like missing rows.
//! - Deleting a college or an assessment cascades explicitly to its
//!   dependents.
//! - Unique constraints (college name, per-kind email, progress topic per
//!   student) surface as [`StoreError::Conflict`].
use crate::model::{
    Assessment, AssessmentCounts, AssessmentUpdate, Attempt, AttemptWithAssessment, College,
    CollegeAdmin, PlatformAdmin, Progress, ProgressUpdate, Question, Student,
    StudentActivityCounts,
};
use async_trait::async_trait;
use campus_authz::Scope;
use std::collections::HashMap;
use thiserror::Error;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row".to_string()),
            other => StoreError::Unexpected(other.into()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Unexpected(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Tenant-scoped totals for dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardCounts {
    pub students: u64,
    pub assessments: u64,
    pub attempts: u64,
}

#[async_trait]
pub trait CampusStore: Send + Sync {
    /// Newest first.
    async fn list_colleges(&self) -> StoreResult<Vec<College>>;
    async fn find_college_by_name(&self, name: &str) -> StoreResult<Option<College>>;
    async fn get_college(&self, college_id: &str) -> StoreResult<College>;
    async fn create_college(&self, college: College) -> StoreResult<College>;
    /// Removes the college and everything it owns.
    async fn delete_college(&self, college_id: &str) -> StoreResult<()>;

    async fn find_platform_admin_by_email(&self, email: &str)
    -> StoreResult<Option<PlatformAdmin>>;
    async fn list_platform_admins(&self) -> StoreResult<Vec<PlatformAdmin>>;
    async fn create_platform_admin(&self, admin: PlatformAdmin) -> StoreResult<PlatformAdmin>;
    async fn delete_platform_admin(&self, admin_id: &str) -> StoreResult<()>;

    /// Looks across current and legacy admins; email is unique over both.
    async fn find_college_admin_by_email(&self, email: &str) -> StoreResult<Option<CollegeAdmin>>;
    async fn list_college_admins(&self, scope: &Scope) -> StoreResult<Vec<CollegeAdmin>>;
    async fn create_college_admin(
        &self,
        admin: CollegeAdmin,
        scope: &Scope,
    ) -> StoreResult<CollegeAdmin>;
    async fn delete_college_admin(&self, admin_id: &str, scope: &Scope) -> StoreResult<()>;

    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<Student>>;
    async fn create_student(&self, student: Student) -> StoreResult<Student>;
    async fn get_student(&self, student_id: &str, scope: &Scope) -> StoreResult<Student>;
    /// Newest first.
    async fn list_students(&self, scope: &Scope) -> StoreResult<Vec<Student>>;
    /// Batched roster counts; ids with no activity map to zeros.
    async fn student_activity_counts(
        &self,
        student_ids: &[String],
    ) -> StoreResult<HashMap<String, StudentActivityCounts>>;

    /// Newest first.
    async fn list_assessments(&self, scope: &Scope) -> StoreResult<Vec<Assessment>>;
    /// Batched question/attempt counts; unknown ids map to zeros.
    async fn assessment_counts(
        &self,
        assessment_ids: &[String],
    ) -> StoreResult<HashMap<String, AssessmentCounts>>;
    async fn get_assessment(&self, assessment_id: &str, scope: &Scope) -> StoreResult<Assessment>;
    async fn create_assessment(
        &self,
        assessment: Assessment,
        scope: &Scope,
    ) -> StoreResult<Assessment>;
    async fn update_assessment(
        &self,
        assessment_id: &str,
        update: AssessmentUpdate,
        scope: &Scope,
    ) -> StoreResult<Assessment>;
    /// Removes the assessment with its questions and attempts.
    async fn delete_assessment(&self, assessment_id: &str, scope: &Scope) -> StoreResult<()>;
    async fn insert_questions(
        &self,
        assessment_id: &str,
        questions: Vec<Question>,
        scope: &Scope,
    ) -> StoreResult<Vec<Question>>;
    async fn list_questions(&self, assessment_id: &str, scope: &Scope)
    -> StoreResult<Vec<Question>>;

    async fn record_attempt(&self, attempt: Attempt, scope: &Scope) -> StoreResult<Attempt>;
    /// Newest first, each joined with its assessment's id and title.
    async fn list_attempts(
        &self,
        student_id: &str,
        scope: &Scope,
    ) -> StoreResult<Vec<AttemptWithAssessment>>;

    /// Most recently updated first.
    async fn list_progress(&self, student_id: &str, scope: &Scope) -> StoreResult<Vec<Progress>>;
    async fn upsert_progress(&self, update: ProgressUpdate, scope: &Scope)
    -> StoreResult<Progress>;

    async fn dashboard_counts(&self, scope: &Scope) -> StoreResult<DashboardCounts>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
