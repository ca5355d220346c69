mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use campus_authz::Scope;
use common::{
    PASSWORD, app, college_admin_token, platform_admin_token, seed_college, seed_platform_admin,
    send_json, state_with_store,
};
use http_helpers::{authed_json_request, authed_request, get};
use platform::config::CurriculumConfig;
use platform::model::{
    Assessment, AssessmentCounts, AssessmentUpdate, Attempt, AttemptWithAssessment, College,
    CollegeAdmin, PlatformAdmin, Progress, ProgressUpdate, Question, Student,
    StudentActivityCounts,
};
use platform::store::memory::InMemoryStore;
use platform::store::{CampusStore, DashboardCounts, StoreError, StoreResult};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// Delegates to the in-memory store but fails selected writes.
struct FlakyStore {
    inner: InMemoryStore,
    fail_admin_insert: bool,
    fail_college_delete: bool,
    fail_question_insert: bool,
    fail_assessment_delete: bool,
    fail_health: bool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: InMemoryStore::new(),
            fail_admin_insert: false,
            fail_college_delete: false,
            fail_question_insert: false,
            fail_assessment_delete: false,
            fail_health: false,
        }
    }
}

fn injected(what: &str) -> StoreError {
    StoreError::Unexpected(anyhow::anyhow!("injected failure: {what}"))
}

#[async_trait]
impl CampusStore for FlakyStore {
    async fn list_colleges(&self) -> StoreResult<Vec<College>> {
        self.inner.list_colleges().await
    }
    async fn find_college_by_name(&self, name: &str) -> StoreResult<Option<College>> {
        self.inner.find_college_by_name(name).await
    }
    async fn get_college(&self, college_id: &str) -> StoreResult<College> {
        self.inner.get_college(college_id).await
    }
    async fn create_college(&self, college: College) -> StoreResult<College> {
        self.inner.create_college(college).await
    }
    async fn delete_college(&self, college_id: &str) -> StoreResult<()> {
        if self.fail_college_delete {
            return Err(injected("delete_college"));
        }
        self.inner.delete_college(college_id).await
    }

    async fn find_platform_admin_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<PlatformAdmin>> {
        self.inner.find_platform_admin_by_email(email).await
    }
    async fn list_platform_admins(&self) -> StoreResult<Vec<PlatformAdmin>> {
        self.inner.list_platform_admins().await
    }
    async fn create_platform_admin(&self, admin: PlatformAdmin) -> StoreResult<PlatformAdmin> {
        self.inner.create_platform_admin(admin).await
    }
    async fn delete_platform_admin(&self, admin_id: &str) -> StoreResult<()> {
        self.inner.delete_platform_admin(admin_id).await
    }

    async fn find_college_admin_by_email(&self, email: &str) -> StoreResult<Option<CollegeAdmin>> {
        self.inner.find_college_admin_by_email(email).await
    }
    async fn list_college_admins(&self, scope: &Scope) -> StoreResult<Vec<CollegeAdmin>> {
        self.inner.list_college_admins(scope).await
    }
    async fn create_college_admin(
        &self,
        admin: CollegeAdmin,
        scope: &Scope,
    ) -> StoreResult<CollegeAdmin> {
        if self.fail_admin_insert {
            return Err(injected("create_college_admin"));
        }
        self.inner.create_college_admin(admin, scope).await
    }
    async fn delete_college_admin(&self, admin_id: &str, scope: &Scope) -> StoreResult<()> {
        self.inner.delete_college_admin(admin_id, scope).await
    }

    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<Student>> {
        self.inner.find_student_by_email(email).await
    }
    async fn create_student(&self, student: Student) -> StoreResult<Student> {
        self.inner.create_student(student).await
    }
    async fn get_student(&self, student_id: &str, scope: &Scope) -> StoreResult<Student> {
        self.inner.get_student(student_id, scope).await
    }
    async fn list_students(&self, scope: &Scope) -> StoreResult<Vec<Student>> {
        self.inner.list_students(scope).await
    }
    async fn student_activity_counts(
        &self,
        student_ids: &[String],
    ) -> StoreResult<HashMap<String, StudentActivityCounts>> {
        self.inner.student_activity_counts(student_ids).await
    }

    async fn list_assessments(&self, scope: &Scope) -> StoreResult<Vec<Assessment>> {
        self.inner.list_assessments(scope).await
    }
    async fn assessment_counts(
        &self,
        assessment_ids: &[String],
    ) -> StoreResult<HashMap<String, AssessmentCounts>> {
        self.inner.assessment_counts(assessment_ids).await
    }
    async fn get_assessment(&self, assessment_id: &str, scope: &Scope) -> StoreResult<Assessment> {
        self.inner.get_assessment(assessment_id, scope).await
    }
    async fn create_assessment(
        &self,
        assessment: Assessment,
        scope: &Scope,
    ) -> StoreResult<Assessment> {
        self.inner.create_assessment(assessment, scope).await
    }
    async fn update_assessment(
        &self,
        assessment_id: &str,
        update: AssessmentUpdate,
        scope: &Scope,
    ) -> StoreResult<Assessment> {
        self.inner
            .update_assessment(assessment_id, update, scope)
            .await
    }
    async fn delete_assessment(&self, assessment_id: &str, scope: &Scope) -> StoreResult<()> {
        if self.fail_assessment_delete {
            return Err(injected("delete_assessment"));
        }
        self.inner.delete_assessment(assessment_id, scope).await
    }
    async fn insert_questions(
        &self,
        assessment_id: &str,
        questions: Vec<Question>,
        scope: &Scope,
    ) -> StoreResult<Vec<Question>> {
        if self.fail_question_insert {
            return Err(injected("insert_questions"));
        }
        self.inner
            .insert_questions(assessment_id, questions, scope)
            .await
    }
    async fn list_questions(
        &self,
        assessment_id: &str,
        scope: &Scope,
    ) -> StoreResult<Vec<Question>> {
        self.inner.list_questions(assessment_id, scope).await
    }

    async fn record_attempt(&self, attempt: Attempt, scope: &Scope) -> StoreResult<Attempt> {
        self.inner.record_attempt(attempt, scope).await
    }
    async fn list_attempts(
        &self,
        student_id: &str,
        scope: &Scope,
    ) -> StoreResult<Vec<AttemptWithAssessment>> {
        self.inner.list_attempts(student_id, scope).await
    }

    async fn list_progress(&self, student_id: &str, scope: &Scope) -> StoreResult<Vec<Progress>> {
        self.inner.list_progress(student_id, scope).await
    }
    async fn upsert_progress(
        &self,
        update: ProgressUpdate,
        scope: &Scope,
    ) -> StoreResult<Progress> {
        self.inner.upsert_progress(update, scope).await
    }

    async fn dashboard_counts(&self, scope: &Scope) -> StoreResult<DashboardCounts> {
        self.inner.dashboard_counts(scope).await
    }

    async fn health_check(&self) -> StoreResult<()> {
        if self.fail_health {
            return Err(injected("health_check"));
        }
        self.inner.health_check().await
    }
    fn is_durable(&self) -> bool {
        false
    }
    fn backend_name(&self) -> &'static str {
        "flaky"
    }
}

async fn create_college(app: &axum::Router, token: &str) -> (StatusCode, serde_json::Value) {
    send_json(
        app,
        authed_json_request(
            "POST",
            "/api/superadmin/colleges",
            token,
            json!({
                "name": "Acme Institute",
                "adminEmail": "dean@acme.edu",
                "adminPassword": PASSWORD,
                "adminName": "Dean"
            }),
        ),
    )
    .await
}

async fn create_assessment(app: &axum::Router, token: &str) -> (StatusCode, serde_json::Value) {
    send_json(
        app,
        authed_json_request(
            "POST",
            "/api/assessments",
            token,
            json!({
                "title": "Linear structures",
                "questions": [{
                    "question": "Which structure is LIFO?",
                    "optionA": "Queue",
                    "optionB": "Stack",
                    "optionC": "Heap",
                    "optionD": "Trie",
                    "correctAnswer": "B"
                }]
            }),
        ),
    )
    .await
}

#[tokio::test]
async fn failed_admin_insert_removes_the_college() {
    let store = FlakyStore {
        fail_admin_insert: true,
        ..FlakyStore::new()
    };
    let state = state_with_store(Arc::new(store), CurriculumConfig::default());
    let app = app(&state);
    seed_platform_admin(&state, "root@campus.dev").await;
    let root = platform_admin_token(&app, "root@campus.dev").await;

    let (status, body) = create_college(&app, &root).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "internal");

    let colleges = state.store.list_colleges().await.expect("colleges");
    assert!(colleges.is_empty());
    let (status, body) = send_json(
        &app,
        authed_request("GET", "/api/superadmin/colleges", &root),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn failed_compensation_still_reports_the_original_error() {
    let store = FlakyStore {
        fail_admin_insert: true,
        fail_college_delete: true,
        ..FlakyStore::new()
    };
    let state = state_with_store(Arc::new(store), CurriculumConfig::default());
    let app = app(&state);
    seed_platform_admin(&state, "root@campus.dev").await;
    let root = platform_admin_token(&app, "root@campus.dev").await;

    let (status, body) = create_college(&app, &root).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to create admin");

    // The orphaned college stays behind.
    let colleges = state.store.list_colleges().await.expect("colleges");
    assert_eq!(colleges.len(), 1);
}

#[tokio::test]
async fn failed_question_insert_removes_the_assessment() {
    let store = FlakyStore {
        fail_question_insert: true,
        ..FlakyStore::new()
    };
    let state = state_with_store(Arc::new(store), CurriculumConfig::default());
    let app = app(&state);
    seed_college(&state, "Acme Institute", "admin@acme.edu").await;
    let admin = college_admin_token(&app, "admin@acme.edu").await;

    let (status, body) = create_assessment(&app, &admin).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to create questions");
    assert_eq!(body["code"], "internal");

    let assessments = state
        .store
        .list_assessments(&Scope::Unscoped)
        .await
        .expect("assessments");
    assert!(assessments.is_empty());
    let (status, body) = send_json(&app, authed_request("GET", "/api/assessments", &admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn failed_assessment_compensation_keeps_the_original_error() {
    let store = FlakyStore {
        fail_question_insert: true,
        fail_assessment_delete: true,
        ..FlakyStore::new()
    };
    let state = state_with_store(Arc::new(store), CurriculumConfig::default());
    let app = app(&state);
    seed_college(&state, "Acme Institute", "admin@acme.edu").await;
    let admin = college_admin_token(&app, "admin@acme.edu").await;

    let (status, body) = create_assessment(&app, &admin).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to create questions");

    // The orphaned assessment stays behind, without questions.
    let assessments = state
        .store
        .list_assessments(&Scope::Unscoped)
        .await
        .expect("assessments");
    assert_eq!(assessments.len(), 1);
    let questions = state
        .store
        .list_questions(&assessments[0].id, &Scope::Unscoped)
        .await
        .expect("questions");
    assert!(questions.is_empty());
}

#[tokio::test]
async fn health_reports_store_failure() {
    let store = FlakyStore {
        fail_health: true,
        ..FlakyStore::new()
    };
    let state = state_with_store(Arc::new(store), CurriculumConfig::default());
    let app = app(&state);

    let (status, body) = send_json(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Storage unavailable");
}
