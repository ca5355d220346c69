#![cfg(feature = "pg-tests")]
//! Postgres store checks against a real database.
//!
//! Run with `cargo test -p platform --features pg-tests pg_store`; set
//! `CAMPUS_TEST_DATABASE_URL` (or `DATABASE_URL`). Tests skip when no
//! database is reachable.

use campus_authz::Scope;
use chrono::Utc;
use platform::config;
use platform::model::{
    AnswerLetter, Assessment, Attempt, College, CollegeAdmin, ProgressUpdate, Question, Student,
    TopicStatus, new_id,
};
use platform::provisioning;
use platform::store::postgres::PostgresStore;
use platform::store::{CampusStore, StoreError};
use serial_test::serial;
use sqlx::postgres::PgPoolOptions;
use std::collections::BTreeMap;
use std::sync::Arc;

static PG_STORE: tokio::sync::OnceCell<Arc<PostgresStore>> = tokio::sync::OnceCell::const_new();

async fn reset_postgres(url: &str) -> Result<(), sqlx::Error> {
    let pool = match tokio::time::timeout(
        std::time::Duration::from_secs(2),
        PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(std::time::Duration::from_secs(2))
            .connect(url),
    )
    .await
    {
        Ok(result) => result?,
        Err(_) => return Err(sqlx::Error::PoolTimedOut),
    };
    let exists: bool = sqlx::query_scalar("SELECT to_regclass('public.colleges') IS NOT NULL")
        .fetch_one(&pool)
        .await?;
    if exists {
        sqlx::query(
            "TRUNCATE progress, attempts, questions, assessments, students, college_admins, \
             platform_admins, colleges",
        )
        .execute(&pool)
        .await?;
    }
    Ok(())
}

async fn pg_store() -> Option<Arc<PostgresStore>> {
    let url = match std::env::var("CAMPUS_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping pg-tests: set CAMPUS_TEST_DATABASE_URL or DATABASE_URL");
            return None;
        }
    };
    if let Err(err) = reset_postgres(&url).await {
        eprintln!("skipping pg-tests: cannot connect to postgres: {err}");
        return None;
    }
    let pg_cfg = config::PostgresConfig {
        url,
        max_connections: 5,
        connect_timeout_ms: 5_000,
        acquire_timeout_ms: 5_000,
    };
    let store = match PG_STORE
        .get_or_try_init(|| async { PostgresStore::connect(&pg_cfg).await.map(Arc::new) })
        .await
    {
        Ok(store) => Arc::clone(store),
        Err(err) => {
            eprintln!("skipping pg-tests: connect postgres store failed: {err}");
            return None;
        }
    };
    Some(store)
}

async fn seed(store: &PostgresStore, name: &str) -> (College, Student) {
    let college = College {
        id: new_id(),
        name: name.to_string(),
        created_at: Utc::now(),
    };
    let admin = CollegeAdmin {
        id: new_id(),
        email: format!("admin@{}.edu", college.id),
        password_hash: "hash".to_string(),
        name: "Admin".to_string(),
        college_id: college.id.clone(),
        created_at: Utc::now(),
        legacy: false,
    };
    let (college, _) = provisioning::create_college_with_admin(store, college, admin)
        .await
        .expect("college");
    let student = store
        .create_student(Student {
            id: new_id(),
            email: format!("student@{}.edu", college.id),
            password_hash: "hash".to_string(),
            name: "Student".to_string(),
            college_id: college.id.clone(),
            created_at: Utc::now(),
        })
        .await
        .expect("student");
    (college, student)
}

#[tokio::test]
#[serial]
async fn pg_scoped_reads_hide_other_colleges() {
    let Some(store) = pg_store().await else {
        return;
    };
    let (acme, _) = seed(&store, "Acme Institute").await;
    let (zenith, zenith_student) = seed(&store, "Zenith University").await;
    let acme_scope = Scope::College {
        college_id: acme.id.clone(),
    };

    let students = store.list_students(&acme_scope).await.expect("students");
    assert_eq!(students.len(), 1);
    assert!(students.iter().all(|s| s.college_id == acme.id));

    let err = store
        .get_student(&zenith_student.id, &acme_scope)
        .await
        .expect_err("hidden");
    assert!(matches!(err, StoreError::NotFound(_)));

    let err = store
        .create_college(College {
            id: new_id(),
            name: zenith.name.clone(),
            created_at: Utc::now(),
        })
        .await
        .expect_err("duplicate name");
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
#[serial]
async fn pg_attempts_and_cascades() {
    let Some(store) = pg_store().await else {
        return;
    };
    let (acme, student) = seed(&store, "Acme Institute").await;
    let college_scope = Scope::College {
        college_id: acme.id.clone(),
    };
    let owner_scope = Scope::Owner {
        student_id: student.id.clone(),
        college_id: acme.id.clone(),
    };

    let assessment = Assessment {
        id: new_id(),
        title: "Linear structures".to_string(),
        description: None,
        college_id: acme.id.clone(),
        created_at: Utc::now(),
    };
    let question = Question {
        id: new_id(),
        assessment_id: assessment.id.clone(),
        question: "Which structure is LIFO?".to_string(),
        option_a: "Queue".to_string(),
        option_b: "Stack".to_string(),
        option_c: "Heap".to_string(),
        option_d: "Trie".to_string(),
        correct_answer: AnswerLetter::B,
        points: 2,
    };
    let (assessment, questions) = provisioning::create_assessment_with_questions(
        &*store,
        assessment,
        vec![question],
        &college_scope,
    )
    .await
    .expect("assessment");

    let mut answers = BTreeMap::new();
    answers.insert(questions[0].id.clone(), "B".to_string());
    answers.insert("skipped".to_string(), String::new());
    store
        .record_attempt(
            Attempt {
                id: new_id(),
                student_id: student.id.clone(),
                assessment_id: assessment.id.clone(),
                score: 2,
                total_points: 2,
                answers,
                completed_at: Utc::now(),
            },
            &owner_scope,
        )
        .await
        .expect("attempt");

    let attempts = store
        .list_attempts(&student.id, &owner_scope)
        .await
        .expect("attempts");
    assert_eq!(attempts.len(), 1);
    assert_eq!(
        attempts[0].assessment.as_ref().map(|a| a.title.as_str()),
        Some("Linear structures")
    );
    assert_eq!(attempts[0].attempt.answers["skipped"], "");

    let counts = store
        .assessment_counts(std::slice::from_ref(&assessment.id))
        .await
        .expect("counts");
    assert_eq!(counts[&assessment.id].questions, 1);
    assert_eq!(counts[&assessment.id].attempts, 1);

    store
        .delete_assessment(&assessment.id, &college_scope)
        .await
        .expect("delete");
    let attempts = store
        .list_attempts(&student.id, &owner_scope)
        .await
        .expect("attempts");
    assert!(attempts.is_empty());

    store.delete_college(&acme.id).await.expect("delete college");
    assert!(
        store
            .find_student_by_email(&student.email)
            .await
            .expect("lookup")
            .is_none()
    );
}

#[tokio::test]
#[serial]
async fn pg_progress_upsert_is_unique_per_topic() {
    let Some(store) = pg_store().await else {
        return;
    };
    let (acme, student) = seed(&store, "Acme Institute").await;
    let scope = Scope::Owner {
        student_id: student.id.clone(),
        college_id: acme.id.clone(),
    };
    for (status, progress) in [(TopicStatus::InProgress, 30), (TopicStatus::Completed, 100)] {
        store
            .upsert_progress(
                ProgressUpdate {
                    student_id: student.id.clone(),
                    topic: "arrays".to_string(),
                    status,
                    progress,
                },
                &scope,
            )
            .await
            .expect("upsert");
    }
    let rows = store.list_progress(&student.id, &scope).await.expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, TopicStatus::Completed);
    assert_eq!(rows[0].progress, 100);
}
