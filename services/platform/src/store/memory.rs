//! In-memory implementation of the campus store.
//!
//! # Purpose
//! Implements [`CampusStore`] entirely in memory. It exists for:
//! - local development and tests (no external dependencies)
//! - single-node demos where durability is not required
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: every table lives behind one
//!   `tokio::sync::RwLock`, so cascades and check-then-insert uniqueness run
//!   atomically with respect to each other.
//!
//! # Performance characteristics
//! - Reads are concurrent; writes are serialized.
//! - Scoped listings and cascades scan whole tables. This is fine for dev
//!   workloads and would not be at large scale.
use super::{CampusStore, DashboardCounts, StoreError, StoreResult};
use crate::model::{
    Assessment, AssessmentCounts, AssessmentRef, AssessmentUpdate, Attempt,
    AttemptWithAssessment, College, CollegeAdmin, PlatformAdmin, Progress, ProgressUpdate,
    Question, Student, StudentActivityCounts, new_id,
};
use async_trait::async_trait;
use campus_authz::Scope;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    colleges: HashMap<String, College>,
    platform_admins: HashMap<String, PlatformAdmin>,
    college_admins: HashMap<String, CollegeAdmin>,
    students: HashMap<String, Student>,
    assessments: HashMap<String, Assessment>,
    /// Questions per assessment id, in insertion order.
    questions: HashMap<String, Vec<Question>>,
    attempts: HashMap<String, Attempt>,
    /// Keyed by `(student_id, topic)`.
    progress: HashMap<(String, String), Progress>,
}

impl Tables {
    fn student_in_scope(&self, student_id: &str, scope: &Scope) -> StoreResult<&Student> {
        self.students
            .get(student_id)
            .filter(|student| scope.admits_owner(&student.id, &student.college_id))
            .ok_or_else(|| StoreError::NotFound("student".into()))
    }

    fn assessment_in_scope(&self, assessment_id: &str, scope: &Scope) -> StoreResult<&Assessment> {
        self.assessments
            .get(assessment_id)
            .filter(|assessment| scope.admits_college(&assessment.college_id))
            .ok_or_else(|| StoreError::NotFound("assessment".into()))
    }

    fn require_college(&self, college_id: &str, scope: &Scope) -> StoreResult<()> {
        if !scope.admits_college(college_id) || !self.colleges.contains_key(college_id) {
            return Err(StoreError::NotFound("college".into()));
        }
        Ok(())
    }

    fn attempt_in_scope(&self, attempt: &Attempt, scope: &Scope) -> bool {
        self.students
            .get(&attempt.student_id)
            .is_some_and(|student| scope.admits_owner(&student.id, &student.college_id))
    }
}

/// In-memory campus store.
///
/// Cloning shares the underlying tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T, K: Ord>(items: &mut [T], key: impl Fn(&T) -> K) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl CampusStore for InMemoryStore {
    async fn list_colleges(&self) -> StoreResult<Vec<College>> {
        let tables = self.tables.read().await;
        let mut items: Vec<College> = tables.colleges.values().cloned().collect();
        newest_first(&mut items, |college| college.created_at);
        Ok(items)
    }

    async fn find_college_by_name(&self, name: &str) -> StoreResult<Option<College>> {
        let tables = self.tables.read().await;
        Ok(tables
            .colleges
            .values()
            .find(|college| college.name == name)
            .cloned())
    }

    async fn get_college(&self, college_id: &str) -> StoreResult<College> {
        let tables = self.tables.read().await;
        tables
            .colleges
            .get(college_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("college".into()))
    }

    async fn create_college(&self, college: College) -> StoreResult<College> {
        let mut tables = self.tables.write().await;
        if tables
            .colleges
            .values()
            .any(|existing| existing.name == college.name)
        {
            return Err(StoreError::Conflict("college name exists".into()));
        }
        if tables.colleges.contains_key(&college.id) {
            return Err(StoreError::Conflict("college exists".into()));
        }
        tables.colleges.insert(college.id.clone(), college.clone());
        Ok(college)
    }

    async fn delete_college(&self, college_id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.colleges.remove(college_id).is_none() {
            return Err(StoreError::NotFound("college".into()));
        }
        tables
            .college_admins
            .retain(|_, admin| admin.college_id != college_id);

        let student_ids: HashSet<String> = tables
            .students
            .values()
            .filter(|student| student.college_id == college_id)
            .map(|student| student.id.clone())
            .collect();
        tables
            .students
            .retain(|id, _| !student_ids.contains(id));

        let assessment_ids: HashSet<String> = tables
            .assessments
            .values()
            .filter(|assessment| assessment.college_id == college_id)
            .map(|assessment| assessment.id.clone())
            .collect();
        tables
            .assessments
            .retain(|id, _| !assessment_ids.contains(id));
        tables
            .questions
            .retain(|id, _| !assessment_ids.contains(id));
        tables.attempts.retain(|_, attempt| {
            !assessment_ids.contains(&attempt.assessment_id)
                && !student_ids.contains(&attempt.student_id)
        });
        tables
            .progress
            .retain(|(student_id, _), _| !student_ids.contains(student_id));
        Ok(())
    }

    async fn find_platform_admin_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<PlatformAdmin>> {
        let tables = self.tables.read().await;
        Ok(tables
            .platform_admins
            .values()
            .find(|admin| admin.email == email)
            .cloned())
    }

    async fn list_platform_admins(&self) -> StoreResult<Vec<PlatformAdmin>> {
        let tables = self.tables.read().await;
        let mut items: Vec<PlatformAdmin> = tables.platform_admins.values().cloned().collect();
        newest_first(&mut items, |admin| admin.created_at);
        Ok(items)
    }

    async fn create_platform_admin(&self, admin: PlatformAdmin) -> StoreResult<PlatformAdmin> {
        let mut tables = self.tables.write().await;
        if tables
            .platform_admins
            .values()
            .any(|existing| existing.email == admin.email)
        {
            return Err(StoreError::Conflict("platform admin email exists".into()));
        }
        tables
            .platform_admins
            .insert(admin.id.clone(), admin.clone());
        Ok(admin)
    }

    async fn delete_platform_admin(&self, admin_id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .platform_admins
            .remove(admin_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound("platform admin".into()))
    }

    async fn find_college_admin_by_email(&self, email: &str) -> StoreResult<Option<CollegeAdmin>> {
        let tables = self.tables.read().await;
        Ok(tables
            .college_admins
            .values()
            .find(|admin| admin.email == email)
            .cloned())
    }

    async fn list_college_admins(&self, scope: &Scope) -> StoreResult<Vec<CollegeAdmin>> {
        let tables = self.tables.read().await;
        let mut items: Vec<CollegeAdmin> = tables
            .college_admins
            .values()
            .filter(|admin| scope.admits_college(&admin.college_id))
            .cloned()
            .collect();
        newest_first(&mut items, |admin| admin.created_at);
        Ok(items)
    }

    async fn create_college_admin(
        &self,
        admin: CollegeAdmin,
        scope: &Scope,
    ) -> StoreResult<CollegeAdmin> {
        let mut tables = self.tables.write().await;
        tables.require_college(&admin.college_id, scope)?;
        if tables
            .college_admins
            .values()
            .any(|existing| existing.email == admin.email)
        {
            return Err(StoreError::Conflict("college admin email exists".into()));
        }
        tables
            .college_admins
            .insert(admin.id.clone(), admin.clone());
        Ok(admin)
    }

    async fn delete_college_admin(&self, admin_id: &str, scope: &Scope) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let visible = tables
            .college_admins
            .get(admin_id)
            .is_some_and(|admin| scope.admits_college(&admin.college_id));
        if !visible {
            return Err(StoreError::NotFound("college admin".into()));
        }
        tables.college_admins.remove(admin_id);
        Ok(())
    }

    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<Student>> {
        let tables = self.tables.read().await;
        Ok(tables
            .students
            .values()
            .find(|student| student.email == email)
            .cloned())
    }

    async fn create_student(&self, student: Student) -> StoreResult<Student> {
        let mut tables = self.tables.write().await;
        tables.require_college(&student.college_id, &Scope::Unscoped)?;
        if tables
            .students
            .values()
            .any(|existing| existing.email == student.email)
        {
            return Err(StoreError::Conflict("student email exists".into()));
        }
        tables.students.insert(student.id.clone(), student.clone());
        Ok(student)
    }

    async fn get_student(&self, student_id: &str, scope: &Scope) -> StoreResult<Student> {
        let tables = self.tables.read().await;
        tables.student_in_scope(student_id, scope).cloned()
    }

    async fn list_students(&self, scope: &Scope) -> StoreResult<Vec<Student>> {
        let tables = self.tables.read().await;
        let mut items: Vec<Student> = tables
            .students
            .values()
            .filter(|student| scope.admits_owner(&student.id, &student.college_id))
            .cloned()
            .collect();
        newest_first(&mut items, |student| student.created_at);
        Ok(items)
    }

    async fn student_activity_counts(
        &self,
        student_ids: &[String],
    ) -> StoreResult<HashMap<String, StudentActivityCounts>> {
        let tables = self.tables.read().await;
        let mut counts: HashMap<String, StudentActivityCounts> = student_ids
            .iter()
            .map(|id| (id.clone(), StudentActivityCounts::default()))
            .collect();
        for attempt in tables.attempts.values() {
            if let Some(entry) = counts.get_mut(&attempt.student_id) {
                entry.assessment_attempts += 1;
            }
        }
        for (student_id, _) in tables.progress.keys() {
            if let Some(entry) = counts.get_mut(student_id) {
                entry.progress += 1;
            }
        }
        Ok(counts)
    }

    async fn list_assessments(&self, scope: &Scope) -> StoreResult<Vec<Assessment>> {
        let tables = self.tables.read().await;
        let mut items: Vec<Assessment> = tables
            .assessments
            .values()
            .filter(|assessment| scope.admits_college(&assessment.college_id))
            .cloned()
            .collect();
        newest_first(&mut items, |assessment| assessment.created_at);
        Ok(items)
    }

    async fn assessment_counts(
        &self,
        assessment_ids: &[String],
    ) -> StoreResult<HashMap<String, AssessmentCounts>> {
        let tables = self.tables.read().await;
        let mut counts: HashMap<String, AssessmentCounts> = assessment_ids
            .iter()
            .map(|id| {
                let questions = tables.questions.get(id).map_or(0, Vec::len) as u64;
                (
                    id.clone(),
                    AssessmentCounts {
                        questions,
                        attempts: 0,
                    },
                )
            })
            .collect();
        for attempt in tables.attempts.values() {
            if let Some(entry) = counts.get_mut(&attempt.assessment_id) {
                entry.attempts += 1;
            }
        }
        Ok(counts)
    }

    async fn get_assessment(&self, assessment_id: &str, scope: &Scope) -> StoreResult<Assessment> {
        let tables = self.tables.read().await;
        tables.assessment_in_scope(assessment_id, scope).cloned()
    }

    async fn create_assessment(
        &self,
        assessment: Assessment,
        scope: &Scope,
    ) -> StoreResult<Assessment> {
        let mut tables = self.tables.write().await;
        tables.require_college(&assessment.college_id, scope)?;
        if tables.assessments.contains_key(&assessment.id) {
            return Err(StoreError::Conflict("assessment exists".into()));
        }
        tables
            .assessments
            .insert(assessment.id.clone(), assessment.clone());
        Ok(assessment)
    }

    async fn update_assessment(
        &self,
        assessment_id: &str,
        update: AssessmentUpdate,
        scope: &Scope,
    ) -> StoreResult<Assessment> {
        let mut tables = self.tables.write().await;
        tables.assessment_in_scope(assessment_id, scope)?;
        let assessment = tables
            .assessments
            .get_mut(assessment_id)
            .ok_or_else(|| StoreError::NotFound("assessment".into()))?;
        if let Some(title) = update.title {
            assessment.title = title;
        }
        if let Some(description) = update.description {
            assessment.description = Some(description);
        }
        Ok(assessment.clone())
    }

    async fn delete_assessment(&self, assessment_id: &str, scope: &Scope) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.assessment_in_scope(assessment_id, scope)?;
        tables.assessments.remove(assessment_id);
        tables.questions.remove(assessment_id);
        tables
            .attempts
            .retain(|_, attempt| attempt.assessment_id != assessment_id);
        Ok(())
    }

    async fn insert_questions(
        &self,
        assessment_id: &str,
        questions: Vec<Question>,
        scope: &Scope,
    ) -> StoreResult<Vec<Question>> {
        let mut tables = self.tables.write().await;
        tables.assessment_in_scope(assessment_id, scope)?;
        tables
            .questions
            .entry(assessment_id.to_string())
            .or_default()
            .extend(questions.iter().cloned());
        Ok(questions)
    }

    async fn list_questions(
        &self,
        assessment_id: &str,
        scope: &Scope,
    ) -> StoreResult<Vec<Question>> {
        let tables = self.tables.read().await;
        tables.assessment_in_scope(assessment_id, scope)?;
        Ok(tables
            .questions
            .get(assessment_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn record_attempt(&self, attempt: Attempt, scope: &Scope) -> StoreResult<Attempt> {
        let mut tables = self.tables.write().await;
        tables.student_in_scope(&attempt.student_id, scope)?;
        tables.assessment_in_scope(&attempt.assessment_id, scope)?;
        tables.attempts.insert(attempt.id.clone(), attempt.clone());
        Ok(attempt)
    }

    async fn list_attempts(
        &self,
        student_id: &str,
        scope: &Scope,
    ) -> StoreResult<Vec<AttemptWithAssessment>> {
        let tables = self.tables.read().await;
        tables.student_in_scope(student_id, scope)?;
        let mut items: Vec<AttemptWithAssessment> = tables
            .attempts
            .values()
            .filter(|attempt| attempt.student_id == student_id)
            .map(|attempt| AttemptWithAssessment {
                attempt: attempt.clone(),
                assessment: tables
                    .assessments
                    .get(&attempt.assessment_id)
                    .map(|assessment| AssessmentRef {
                        id: assessment.id.clone(),
                        title: assessment.title.clone(),
                    }),
            })
            .collect();
        newest_first(&mut items, |item| item.attempt.completed_at);
        Ok(items)
    }

    async fn list_progress(&self, student_id: &str, scope: &Scope) -> StoreResult<Vec<Progress>> {
        let tables = self.tables.read().await;
        tables.student_in_scope(student_id, scope)?;
        let mut items: Vec<Progress> = tables
            .progress
            .values()
            .filter(|row| row.student_id == student_id)
            .cloned()
            .collect();
        newest_first(&mut items, |row| row.updated_at);
        Ok(items)
    }

    async fn upsert_progress(
        &self,
        update: ProgressUpdate,
        scope: &Scope,
    ) -> StoreResult<Progress> {
        let mut tables = self.tables.write().await;
        tables.student_in_scope(&update.student_id, scope)?;
        let now = Utc::now();
        let row = tables
            .progress
            .entry((update.student_id.clone(), update.topic.clone()))
            .and_modify(|row| {
                row.status = update.status;
                row.progress = update.progress;
                row.updated_at = now;
            })
            .or_insert_with(|| Progress {
                id: new_id(),
                student_id: update.student_id.clone(),
                topic: update.topic.clone(),
                status: update.status,
                progress: update.progress,
                updated_at: now,
            });
        Ok(row.clone())
    }

    async fn dashboard_counts(&self, scope: &Scope) -> StoreResult<DashboardCounts> {
        let tables = self.tables.read().await;
        Ok(DashboardCounts {
            students: tables
                .students
                .values()
                .filter(|student| scope.admits_owner(&student.id, &student.college_id))
                .count() as u64,
            assessments: tables
                .assessments
                .values()
                .filter(|assessment| scope.admits_college(&assessment.college_id))
                .count() as u64,
            attempts: tables
                .attempts
                .values()
                .filter(|attempt| tables.attempt_in_scope(attempt, scope))
                .count() as u64,
        })
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
