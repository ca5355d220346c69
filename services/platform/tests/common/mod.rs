#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use chrono::Utc;
use platform::app::{AppState, build_router};
use platform::config::{AuthConfig, CurriculumConfig, TOKEN_AUDIENCE, TOKEN_ISSUER};
use platform::model::{College, CollegeAdmin, PlatformAdmin, new_id};
use platform::provisioning;
use platform::store::CampusStore;
use platform::store::memory::InMemoryStore;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "campus-integration-secret".to_string(),
        secret_generated: false,
        token_ttl: Duration::from_secs(600),
        bcrypt_cost: 4,
        issuer: TOKEN_ISSUER.to_string(),
        audience: TOKEN_AUDIENCE.to_string(),
        leeway_secs: 0,
    }
}

pub fn test_state() -> AppState {
    state_with_store(Arc::new(InMemoryStore::new()), CurriculumConfig::default())
}

pub fn state_with_store(
    store: Arc<dyn CampusStore + Send + Sync>,
    curriculum: CurriculumConfig,
) -> AppState {
    AppState::new(store, &auth_config(), curriculum).expect("state")
}

pub fn app(state: &AppState) -> Router {
    build_router(state.clone())
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("response")
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// Status plus parsed body, for assertions that need both.
pub async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = send(app, request).await;
    let status = response.status();
    (status, read_json(response).await)
}

/// College with one admin, inserted straight through the store.
pub async fn seed_college(state: &AppState, name: &str, admin_email: &str) -> College {
    let password_hash = state.passwords.hash_password(PASSWORD).expect("hash");
    let college = College {
        id: new_id(),
        name: name.to_string(),
        created_at: Utc::now(),
    };
    let admin = CollegeAdmin {
        id: new_id(),
        email: admin_email.to_string(),
        password_hash,
        name: format!("{name} Admin"),
        college_id: college.id.clone(),
        created_at: Utc::now(),
        legacy: false,
    };
    let (college, _) =
        provisioning::create_college_with_admin(&*state.store, college, admin)
            .await
            .expect("seed college");
    college
}

pub async fn seed_platform_admin(state: &AppState, email: &str) -> PlatformAdmin {
    let password_hash = state.passwords.hash_password(PASSWORD).expect("hash");
    state
        .store
        .create_platform_admin(PlatformAdmin {
            id: new_id(),
            email: email.to_string(),
            password_hash,
            name: "Platform Admin".to_string(),
            created_at: Utc::now(),
        })
        .await
        .expect("seed platform admin")
}

/// Registers a student through the signup endpoint and returns `(id, token)`.
pub async fn signup_student(app: &Router, college_name: &str, email: &str) -> (String, String) {
    let (status, body) = send_json(
        app,
        crate::http_helpers::json_request(
            "POST",
            "/api/auth/student/signup",
            serde_json::json!({
                "email": email,
                "password": PASSWORD,
                "name": "Test Student",
                "collegeName": college_name,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    (
        body["user"]["id"].as_str().expect("id").to_string(),
        body["token"].as_str().expect("token").to_string(),
    )
}

/// Logs in through `path` with the shared test password and returns the token.
pub async fn login(app: &Router, path: &str, email: &str) -> String {
    let (status, body) = send_json(
        app,
        crate::http_helpers::json_request(
            "POST",
            path,
            serde_json::json!({ "email": email, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().expect("token").to_string()
}

pub async fn college_admin_token(app: &Router, email: &str) -> String {
    login(app, "/api/auth/collegeadmin/login", email).await
}

pub async fn platform_admin_token(app: &Router, email: &str) -> String {
    login(app, "/api/auth/superadmin/login", email).await
}

/// Two-question assessment (2 points + default 1 point) created by a college
/// admin. Returns the created body with `questions`.
pub async fn create_assessment(app: &Router, admin_token: &str, title: &str) -> serde_json::Value {
    let (status, body) = send_json(
        app,
        crate::http_helpers::authed_json_request(
            "POST",
            "/api/assessments",
            admin_token,
            serde_json::json!({
                "title": title,
                "description": "Stacks and queues",
                "questions": [
                    {
                        "question": "Which structure is LIFO?",
                        "optionA": "Queue",
                        "optionB": "Stack",
                        "optionC": "Heap",
                        "optionD": "Trie",
                        "correctAnswer": "B",
                        "points": 2
                    },
                    {
                        "question": "Which structure is FIFO?",
                        "optionA": "Queue",
                        "optionB": "Stack",
                        "optionC": "Heap",
                        "optionD": "Trie",
                        "correctAnswer": "A"
                    }
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create assessment failed: {body}");
    body
}
