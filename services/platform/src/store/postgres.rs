//! Postgres-backed implementation of the campus store.
//!
//! # What this module is
//! Implements [`CampusStore`] on top of `sqlx` and a pooled Postgres
//! connection. It is the durable backend for tenants, accounts, assessments,
//! attempts and progress.
//!
//! # Key invariants
//! - Tenant scoping is applied in SQL. Every scoped query binds the scope's
//!   college id and owner id as nullable parameters
//!   (`$n::TEXT IS NULL OR column = $n`), so an unscoped caller binds `NULL`.
//! - Unique constraints map to [`StoreError::Conflict`]; foreign key
//!   violations on insert map to [`StoreError::NotFound`] for the parent.
//! - Cascading deletes run inside one transaction and delete dependents
//!   explicitly, even though the schema also declares `ON DELETE CASCADE`.
//!
//! # Operational notes
//! - Migrations run at startup via `sqlx::migrate!("./migrations")`; a failed
//!   migration fails startup.
//! - Database URLs may contain credentials; never log them.
use super::{CampusStore, DashboardCounts, StoreError, StoreResult};
use crate::config::PostgresConfig;
use crate::model::{
    AnswerLetter, Assessment, AssessmentCounts, AssessmentRef, AssessmentUpdate, Attempt,
    AttemptWithAssessment, College, CollegeAdmin, PlatformAdmin, Progress, ProgressUpdate,
    Question, Student, StudentActivityCounts, TopicStatus,
};
use anyhow::anyhow;
use async_trait::async_trait;
use campus_authz::Scope;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::time::Duration;

/// Durable campus store backed by Postgres.
///
/// # Example
/// ```rust,no_run
/// use platform::config::PostgresConfig;
/// use platform::store::postgres::PostgresStore;
///
/// async fn open(pg: PostgresConfig) {
///     let _ = PostgresStore::connect(&pg).await;
/// }
/// ```
pub struct PostgresStore {
    pool: PgPool,
}

#[derive(Debug, Clone, FromRow)]
struct DbCollege {
    id: String,
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct DbPlatformAdmin {
    id: String,
    email: String,
    password_hash: String,
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct DbCollegeAdmin {
    id: String,
    email: String,
    password_hash: String,
    name: String,
    college_id: String,
    created_at: DateTime<Utc>,
    legacy: bool,
}

#[derive(Debug, Clone, FromRow)]
struct DbStudent {
    id: String,
    email: String,
    password_hash: String,
    name: String,
    college_id: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct DbAssessment {
    id: String,
    title: String,
    description: Option<String>,
    college_id: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct DbQuestion {
    id: String,
    assessment_id: String,
    question: String,
    option_a: String,
    option_b: String,
    option_c: String,
    option_d: String,
    correct_answer: String,
    points: i32,
}

/// Attempt row joined with its assessment's title.
#[derive(Debug, Clone, FromRow)]
struct DbAttempt {
    id: String,
    student_id: String,
    assessment_id: String,
    score: i32,
    total_points: i32,
    answers: Json<BTreeMap<String, String>>,
    completed_at: DateTime<Utc>,
    assessment_title: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
struct DbProgress {
    id: String,
    student_id: String,
    topic: String,
    status: String,
    progress: i16,
    updated_at: DateTime<Utc>,
}

const COLLEGE_COLUMNS: &str = "id, name, created_at";
const PLATFORM_ADMIN_COLUMNS: &str = "id, email, password_hash, name, created_at";
const COLLEGE_ADMIN_COLUMNS: &str =
    "id, email, password_hash, name, college_id, created_at, legacy";
const STUDENT_COLUMNS: &str = "id, email, password_hash, name, college_id, created_at";
const ASSESSMENT_COLUMNS: &str = "id, title, description, college_id, created_at";
const QUESTION_COLUMNS: &str = "id, assessment_id, question, option_a, option_b, option_c, \
     option_d, correct_answer, points";
const PROGRESS_COLUMNS: &str = "id, student_id, topic, status, progress, updated_at";

impl PostgresStore {
    /// Connect, build the pool, and apply migrations.
    pub async fn connect(pg: &PostgresConfig) -> StoreResult<Self> {
        let connect_options = PgConnectOptions::from_str(&pg.url)?;
        let connect = PgPoolOptions::new()
            .max_connections(pg.max_connections)
            .acquire_timeout(Duration::from_millis(pg.acquire_timeout_ms))
            .connect_with(connect_options);
        let pool = tokio::time::timeout(Duration::from_millis(pg.connect_timeout_ms), connect)
            .await
            .map_err(|_| StoreError::Unexpected(anyhow!("postgres connect timed out")))??;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let store = Self { pool };
        if let Err(err) = store.refresh_counts().await {
            tracing::warn!(error = %err, "failed to refresh campus gauges");
        }
        Ok(store)
    }

    async fn refresh_counts(&self) -> StoreResult<()> {
        let colleges: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM colleges")
            .fetch_one(&self.pool)
            .await?;
        metrics::gauge!("campus_colleges_total").set(colleges as f64);

        let students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(&self.pool)
            .await?;
        metrics::gauge!("campus_students_total").set(students as f64);
        Ok(())
    }

    async fn refresh_counts_best_effort(&self) {
        if let Err(err) = self.refresh_counts().await {
            tracing::warn!(error = %err, "failed to refresh campus gauges");
        }
    }
}

#[async_trait]
impl CampusStore for PostgresStore {
    async fn list_colleges(&self) -> StoreResult<Vec<College>> {
        let rows = sqlx::query_as::<_, DbCollege>(&format!(
            "SELECT {COLLEGE_COLUMNS} FROM colleges ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(college_from_db).collect())
    }

    async fn find_college_by_name(&self, name: &str) -> StoreResult<Option<College>> {
        let row = sqlx::query_as::<_, DbCollege>(&format!(
            "SELECT {COLLEGE_COLUMNS} FROM colleges WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(college_from_db))
    }

    async fn get_college(&self, college_id: &str) -> StoreResult<College> {
        sqlx::query_as::<_, DbCollege>(&format!(
            "SELECT {COLLEGE_COLUMNS} FROM colleges WHERE id = $1"
        ))
        .bind(college_id)
        .fetch_optional(&self.pool)
        .await?
        .map(college_from_db)
        .ok_or_else(|| StoreError::NotFound("college".into()))
    }

    async fn create_college(&self, college: College) -> StoreResult<College> {
        sqlx::query("INSERT INTO colleges (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(&college.id)
            .bind(&college.name)
            .bind(college.created_at)
            .execute(&self.pool)
            .await
            .map_err(|err| map_insert_error(err, "college name exists", "college"))?;
        self.refresh_counts_best_effort().await;
        Ok(college)
    }

    async fn delete_college(&self, college_id: &str) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM colleges WHERE id = $1")
                .bind(college_id)
                .fetch_one(&mut *tx)
                .await?
                > 0;
        if !exists {
            return Err(StoreError::NotFound("college".into()));
        }

        // Dependents first, leaves before parents.
        sqlx::query(
            r#"DELETE FROM attempts
               WHERE student_id IN (SELECT id FROM students WHERE college_id = $1)
                  OR assessment_id IN (SELECT id FROM assessments WHERE college_id = $1)"#,
        )
        .bind(college_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "DELETE FROM progress WHERE student_id IN (SELECT id FROM students WHERE college_id = $1)",
        )
        .bind(college_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "DELETE FROM questions WHERE assessment_id IN (SELECT id FROM assessments WHERE college_id = $1)",
        )
        .bind(college_id)
        .execute(&mut *tx)
        .await?;
        for table in ["assessments", "students", "college_admins"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE college_id = $1"))
                .bind(college_id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("DELETE FROM colleges WHERE id = $1")
            .bind(college_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        self.refresh_counts_best_effort().await;
        Ok(())
    }

    async fn find_platform_admin_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<PlatformAdmin>> {
        let row = sqlx::query_as::<_, DbPlatformAdmin>(&format!(
            "SELECT {PLATFORM_ADMIN_COLUMNS} FROM platform_admins WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(platform_admin_from_db))
    }

    async fn list_platform_admins(&self) -> StoreResult<Vec<PlatformAdmin>> {
        let rows = sqlx::query_as::<_, DbPlatformAdmin>(&format!(
            "SELECT {PLATFORM_ADMIN_COLUMNS} FROM platform_admins ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(platform_admin_from_db).collect())
    }

    async fn create_platform_admin(&self, admin: PlatformAdmin) -> StoreResult<PlatformAdmin> {
        sqlx::query(
            r#"INSERT INTO platform_admins (id, email, password_hash, name, created_at)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(&admin.id)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(&admin.name)
        .bind(admin.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| map_insert_error(err, "platform admin email exists", "platform admin"))?;
        Ok(admin)
    }

    async fn delete_platform_admin(&self, admin_id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM platform_admins WHERE id = $1")
            .bind(admin_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("platform admin".into()));
        }
        Ok(())
    }

    async fn find_college_admin_by_email(&self, email: &str) -> StoreResult<Option<CollegeAdmin>> {
        let row = sqlx::query_as::<_, DbCollegeAdmin>(&format!(
            "SELECT {COLLEGE_ADMIN_COLUMNS} FROM college_admins WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(college_admin_from_db))
    }

    async fn list_college_admins(&self, scope: &Scope) -> StoreResult<Vec<CollegeAdmin>> {
        let rows = sqlx::query_as::<_, DbCollegeAdmin>(&format!(
            r#"SELECT {COLLEGE_ADMIN_COLUMNS} FROM college_admins
               WHERE ($1::TEXT IS NULL OR college_id = $1)
               ORDER BY created_at DESC"#
        ))
        .bind(scope.college_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(college_admin_from_db).collect())
    }

    async fn create_college_admin(
        &self,
        admin: CollegeAdmin,
        scope: &Scope,
    ) -> StoreResult<CollegeAdmin> {
        if !scope.admits_college(&admin.college_id) {
            return Err(StoreError::NotFound("college".into()));
        }
        sqlx::query(
            r#"INSERT INTO college_admins
               (id, email, password_hash, name, college_id, created_at, legacy)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(&admin.id)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(&admin.name)
        .bind(&admin.college_id)
        .bind(admin.created_at)
        .bind(admin.legacy)
        .execute(&self.pool)
        .await
        .map_err(|err| map_insert_error(err, "college admin email exists", "college"))?;
        Ok(admin)
    }

    async fn delete_college_admin(&self, admin_id: &str, scope: &Scope) -> StoreResult<()> {
        let result = sqlx::query(
            "DELETE FROM college_admins WHERE id = $1 AND ($2::TEXT IS NULL OR college_id = $2)",
        )
        .bind(admin_id)
        .bind(scope.college_id())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("college admin".into()));
        }
        Ok(())
    }

    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<Student>> {
        let row = sqlx::query_as::<_, DbStudent>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(student_from_db))
    }

    async fn create_student(&self, student: Student) -> StoreResult<Student> {
        sqlx::query(
            r#"INSERT INTO students (id, email, password_hash, name, college_id, created_at)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(&student.id)
        .bind(&student.email)
        .bind(&student.password_hash)
        .bind(&student.name)
        .bind(&student.college_id)
        .bind(student.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| map_insert_error(err, "student email exists", "college"))?;
        self.refresh_counts_best_effort().await;
        Ok(student)
    }

    async fn get_student(&self, student_id: &str, scope: &Scope) -> StoreResult<Student> {
        sqlx::query_as::<_, DbStudent>(&format!(
            r#"SELECT {STUDENT_COLUMNS} FROM students
               WHERE id = $1
                 AND ($2::TEXT IS NULL OR college_id = $2)
                 AND ($3::TEXT IS NULL OR id = $3)"#
        ))
        .bind(student_id)
        .bind(scope.college_id())
        .bind(scope.owner_id())
        .fetch_optional(&self.pool)
        .await?
        .map(student_from_db)
        .ok_or_else(|| StoreError::NotFound("student".into()))
    }

    async fn list_students(&self, scope: &Scope) -> StoreResult<Vec<Student>> {
        let rows = sqlx::query_as::<_, DbStudent>(&format!(
            r#"SELECT {STUDENT_COLUMNS} FROM students
               WHERE ($1::TEXT IS NULL OR college_id = $1)
                 AND ($2::TEXT IS NULL OR id = $2)
               ORDER BY created_at DESC"#
        ))
        .bind(scope.college_id())
        .bind(scope.owner_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(student_from_db).collect())
    }

    async fn student_activity_counts(
        &self,
        student_ids: &[String],
    ) -> StoreResult<HashMap<String, StudentActivityCounts>> {
        let mut counts: HashMap<String, StudentActivityCounts> = student_ids
            .iter()
            .map(|id| (id.clone(), StudentActivityCounts::default()))
            .collect();
        let attempts: Vec<(String, i64)> = sqlx::query_as(
            "SELECT student_id, COUNT(*) FROM attempts WHERE student_id = ANY($1) GROUP BY student_id",
        )
        .bind(student_ids)
        .fetch_all(&self.pool)
        .await?;
        for (student_id, total) in attempts {
            if let Some(entry) = counts.get_mut(&student_id) {
                entry.assessment_attempts = total as u64;
            }
        }
        let progress: Vec<(String, i64)> = sqlx::query_as(
            "SELECT student_id, COUNT(*) FROM progress WHERE student_id = ANY($1) GROUP BY student_id",
        )
        .bind(student_ids)
        .fetch_all(&self.pool)
        .await?;
        for (student_id, total) in progress {
            if let Some(entry) = counts.get_mut(&student_id) {
                entry.progress = total as u64;
            }
        }
        Ok(counts)
    }

    async fn list_assessments(&self, scope: &Scope) -> StoreResult<Vec<Assessment>> {
        let rows = sqlx::query_as::<_, DbAssessment>(&format!(
            r#"SELECT {ASSESSMENT_COLUMNS} FROM assessments
               WHERE ($1::TEXT IS NULL OR college_id = $1)
               ORDER BY created_at DESC"#
        ))
        .bind(scope.college_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(assessment_from_db).collect())
    }

    async fn assessment_counts(
        &self,
        assessment_ids: &[String],
    ) -> StoreResult<HashMap<String, AssessmentCounts>> {
        let mut counts: HashMap<String, AssessmentCounts> = assessment_ids
            .iter()
            .map(|id| (id.clone(), AssessmentCounts::default()))
            .collect();
        let questions: Vec<(String, i64)> = sqlx::query_as(
            "SELECT assessment_id, COUNT(*) FROM questions WHERE assessment_id = ANY($1) GROUP BY assessment_id",
        )
        .bind(assessment_ids)
        .fetch_all(&self.pool)
        .await?;
        for (assessment_id, total) in questions {
            if let Some(entry) = counts.get_mut(&assessment_id) {
                entry.questions = total as u64;
            }
        }
        let attempts: Vec<(String, i64)> = sqlx::query_as(
            "SELECT assessment_id, COUNT(*) FROM attempts WHERE assessment_id = ANY($1) GROUP BY assessment_id",
        )
        .bind(assessment_ids)
        .fetch_all(&self.pool)
        .await?;
        for (assessment_id, total) in attempts {
            if let Some(entry) = counts.get_mut(&assessment_id) {
                entry.attempts = total as u64;
            }
        }
        Ok(counts)
    }

    async fn get_assessment(&self, assessment_id: &str, scope: &Scope) -> StoreResult<Assessment> {
        sqlx::query_as::<_, DbAssessment>(&format!(
            r#"SELECT {ASSESSMENT_COLUMNS} FROM assessments
               WHERE id = $1 AND ($2::TEXT IS NULL OR college_id = $2)"#
        ))
        .bind(assessment_id)
        .bind(scope.college_id())
        .fetch_optional(&self.pool)
        .await?
        .map(assessment_from_db)
        .ok_or_else(|| StoreError::NotFound("assessment".into()))
    }

    async fn create_assessment(
        &self,
        assessment: Assessment,
        scope: &Scope,
    ) -> StoreResult<Assessment> {
        if !scope.admits_college(&assessment.college_id) {
            return Err(StoreError::NotFound("college".into()));
        }
        sqlx::query(
            r#"INSERT INTO assessments (id, title, description, college_id, created_at)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(&assessment.id)
        .bind(&assessment.title)
        .bind(&assessment.description)
        .bind(&assessment.college_id)
        .bind(assessment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| map_insert_error(err, "assessment exists", "college"))?;
        Ok(assessment)
    }

    async fn update_assessment(
        &self,
        assessment_id: &str,
        update: AssessmentUpdate,
        scope: &Scope,
    ) -> StoreResult<Assessment> {
        sqlx::query_as::<_, DbAssessment>(&format!(
            r#"UPDATE assessments
               SET title = COALESCE($2, title), description = COALESCE($3, description)
               WHERE id = $1 AND ($4::TEXT IS NULL OR college_id = $4)
               RETURNING {ASSESSMENT_COLUMNS}"#
        ))
        .bind(assessment_id)
        .bind(update.title)
        .bind(update.description)
        .bind(scope.college_id())
        .fetch_optional(&self.pool)
        .await?
        .map(assessment_from_db)
        .ok_or_else(|| StoreError::NotFound("assessment".into()))
    }

    async fn delete_assessment(&self, assessment_id: &str, scope: &Scope) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let visible = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM assessments WHERE id = $1 AND ($2::TEXT IS NULL OR college_id = $2)",
        )
        .bind(assessment_id)
        .bind(scope.college_id())
        .fetch_one(&mut *tx)
        .await?
            > 0;
        if !visible {
            return Err(StoreError::NotFound("assessment".into()));
        }
        for statement in [
            "DELETE FROM attempts WHERE assessment_id = $1",
            "DELETE FROM questions WHERE assessment_id = $1",
            "DELETE FROM assessments WHERE id = $1",
        ] {
            sqlx::query(statement)
                .bind(assessment_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn insert_questions(
        &self,
        assessment_id: &str,
        questions: Vec<Question>,
        scope: &Scope,
    ) -> StoreResult<Vec<Question>> {
        let mut tx = self.pool.begin().await?;
        let next_position: Option<i32> = sqlx::query_scalar(
            r#"SELECT COALESCE(
                   (SELECT MAX(position) + 1 FROM questions WHERE assessment_id = a.id), 0)
               FROM assessments a
               WHERE a.id = $1 AND ($2::TEXT IS NULL OR a.college_id = $2)"#,
        )
        .bind(assessment_id)
        .bind(scope.college_id())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(start) = next_position else {
            return Err(StoreError::NotFound("assessment".into()));
        };
        for (offset, question) in questions.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO questions
                   (id, assessment_id, position, question, option_a, option_b, option_c,
                    option_d, correct_answer, points)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
            )
            .bind(&question.id)
            .bind(assessment_id)
            .bind(start + to_db_int(offset, "question position")?)
            .bind(&question.question)
            .bind(&question.option_a)
            .bind(&question.option_b)
            .bind(&question.option_c)
            .bind(&question.option_d)
            .bind(question.correct_answer.as_str())
            .bind(to_db_int(question.points, "question points")?)
            .execute(&mut *tx)
            .await
            .map_err(|err| map_insert_error(err, "question exists", "assessment"))?;
        }
        tx.commit().await?;
        Ok(questions)
    }

    async fn list_questions(
        &self,
        assessment_id: &str,
        scope: &Scope,
    ) -> StoreResult<Vec<Question>> {
        self.get_assessment(assessment_id, scope).await?;
        let rows = sqlx::query_as::<_, DbQuestion>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE assessment_id = $1 ORDER BY position"
        ))
        .bind(assessment_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(question_from_db).collect()
    }

    async fn record_attempt(&self, attempt: Attempt, scope: &Scope) -> StoreResult<Attempt> {
        self.get_student(&attempt.student_id, scope).await?;
        self.get_assessment(&attempt.assessment_id, scope).await?;
        sqlx::query(
            r#"INSERT INTO attempts
               (id, student_id, assessment_id, score, total_points, answers, completed_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(&attempt.id)
        .bind(&attempt.student_id)
        .bind(&attempt.assessment_id)
        .bind(to_db_int(attempt.score, "attempt score")?)
        .bind(to_db_int(attempt.total_points, "attempt total points")?)
        .bind(Json(&attempt.answers))
        .bind(attempt.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|err| map_insert_error(err, "attempt exists", "assessment"))?;
        Ok(attempt)
    }

    async fn list_attempts(
        &self,
        student_id: &str,
        scope: &Scope,
    ) -> StoreResult<Vec<AttemptWithAssessment>> {
        self.get_student(student_id, scope).await?;
        let rows = sqlx::query_as::<_, DbAttempt>(
            r#"SELECT t.id, t.student_id, t.assessment_id, t.score, t.total_points, t.answers,
                      t.completed_at, a.title AS assessment_title
               FROM attempts t
               LEFT JOIN assessments a ON a.id = t.assessment_id
               WHERE t.student_id = $1
               ORDER BY t.completed_at DESC"#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(attempt_from_db).collect()
    }

    async fn list_progress(&self, student_id: &str, scope: &Scope) -> StoreResult<Vec<Progress>> {
        self.get_student(student_id, scope).await?;
        let rows = sqlx::query_as::<_, DbProgress>(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM progress WHERE student_id = $1 ORDER BY updated_at DESC"
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(progress_from_db).collect()
    }

    async fn upsert_progress(
        &self,
        update: ProgressUpdate,
        scope: &Scope,
    ) -> StoreResult<Progress> {
        self.get_student(&update.student_id, scope).await?;
        let row = sqlx::query_as::<_, DbProgress>(&format!(
            r#"INSERT INTO progress (id, student_id, topic, status, progress, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT (student_id, topic) DO UPDATE
               SET status = EXCLUDED.status,
                   progress = EXCLUDED.progress,
                   updated_at = EXCLUDED.updated_at
               RETURNING {PROGRESS_COLUMNS}"#
        ))
        .bind(crate::model::new_id())
        .bind(&update.student_id)
        .bind(&update.topic)
        .bind(update.status.as_str())
        .bind(update.progress as i16)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        progress_from_db(row)
    }

    async fn dashboard_counts(&self, scope: &Scope) -> StoreResult<DashboardCounts> {
        let students: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM students
               WHERE ($1::TEXT IS NULL OR college_id = $1) AND ($2::TEXT IS NULL OR id = $2)"#,
        )
        .bind(scope.college_id())
        .bind(scope.owner_id())
        .fetch_one(&self.pool)
        .await?;
        let assessments: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assessments WHERE ($1::TEXT IS NULL OR college_id = $1)",
        )
        .bind(scope.college_id())
        .fetch_one(&self.pool)
        .await?;
        let attempts: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM attempts t
               JOIN students s ON s.id = t.student_id
               WHERE ($1::TEXT IS NULL OR s.college_id = $1) AND ($2::TEXT IS NULL OR s.id = $2)"#,
        )
        .bind(scope.college_id())
        .bind(scope.owner_id())
        .fetch_one(&self.pool)
        .await?;
        Ok(DashboardCounts {
            students: students as u64,
            assessments: assessments as u64,
            attempts: attempts as u64,
        })
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().map(|code| code == "23505").unwrap_or(false);
    }
    false
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().map(|code| code == "23503").unwrap_or(false);
    }
    false
}

fn map_insert_error(err: sqlx::Error, conflict: &str, parent: &str) -> StoreError {
    if is_unique_violation(&err) {
        return StoreError::Conflict(conflict.to_string());
    }
    if is_foreign_key_violation(&err) {
        return StoreError::NotFound(parent.to_string());
    }
    StoreError::Unexpected(err.into())
}

/// Checked narrowing into a Postgres `INTEGER` column.
fn to_db_int<T>(value: T, what: &str) -> StoreResult<i32>
where
    T: Copy + std::fmt::Display + TryInto<i32>,
{
    value
        .try_into()
        .map_err(|_| StoreError::Unexpected(anyhow!("{what} {value} exceeds INTEGER range")))
}

fn from_db_int(value: i32, what: &str) -> StoreResult<u32> {
    u32::try_from(value).map_err(|_| StoreError::Unexpected(anyhow!("negative {what} {value}")))
}

fn college_from_db(row: DbCollege) -> College {
    College {
        id: row.id,
        name: row.name,
        created_at: row.created_at,
    }
}

fn platform_admin_from_db(row: DbPlatformAdmin) -> PlatformAdmin {
    PlatformAdmin {
        id: row.id,
        email: row.email,
        password_hash: row.password_hash,
        name: row.name,
        created_at: row.created_at,
    }
}

fn college_admin_from_db(row: DbCollegeAdmin) -> CollegeAdmin {
    CollegeAdmin {
        id: row.id,
        email: row.email,
        password_hash: row.password_hash,
        name: row.name,
        college_id: row.college_id,
        created_at: row.created_at,
        legacy: row.legacy,
    }
}

fn student_from_db(row: DbStudent) -> Student {
    Student {
        id: row.id,
        email: row.email,
        password_hash: row.password_hash,
        name: row.name,
        college_id: row.college_id,
        created_at: row.created_at,
    }
}

fn assessment_from_db(row: DbAssessment) -> Assessment {
    Assessment {
        id: row.id,
        title: row.title,
        description: row.description,
        college_id: row.college_id,
        created_at: row.created_at,
    }
}

fn question_from_db(row: DbQuestion) -> StoreResult<Question> {
    let correct_answer = AnswerLetter::parse(&row.correct_answer).ok_or_else(|| {
        StoreError::Unexpected(anyhow!("invalid correct answer {}", row.correct_answer))
    })?;
    Ok(Question {
        id: row.id,
        assessment_id: row.assessment_id,
        question: row.question,
        option_a: row.option_a,
        option_b: row.option_b,
        option_c: row.option_c,
        option_d: row.option_d,
        correct_answer,
        points: from_db_int(row.points, "question points")?,
    })
}

fn attempt_from_db(row: DbAttempt) -> StoreResult<AttemptWithAssessment> {
    let assessment = row.assessment_title.map(|title| AssessmentRef {
        id: row.assessment_id.clone(),
        title,
    });
    Ok(AttemptWithAssessment {
        attempt: Attempt {
            id: row.id,
            student_id: row.student_id,
            assessment_id: row.assessment_id,
            score: from_db_int(row.score, "attempt score")?,
            total_points: from_db_int(row.total_points, "attempt total points")?,
            answers: row.answers.0,
            completed_at: row.completed_at,
        },
        assessment,
    })
}

fn progress_from_db(row: DbProgress) -> StoreResult<Progress> {
    let status = TopicStatus::parse(&row.status)
        .ok_or_else(|| StoreError::Unexpected(anyhow!("invalid topic status {}", row.status)))?;
    Ok(Progress {
        id: row.id,
        student_id: row.student_id,
        topic: row.topic,
        status,
        progress: row.progress.clamp(0, 100) as u8,
        updated_at: row.updated_at,
    })
}
