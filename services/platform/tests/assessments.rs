mod common;

use axum::http::StatusCode;
use common::{
    app, college_admin_token, create_assessment, seed_college, send_json, signup_student,
    test_state,
};
use http_helpers::{authed_json_request, authed_request};
use serde_json::{Value, json};

fn question_ids(created: &Value) -> (String, String) {
    let questions = created["questions"].as_array().expect("questions");
    (
        questions[0]["id"].as_str().expect("id").to_string(),
        questions[1]["id"].as_str().expect("id").to_string(),
    )
}

#[tokio::test]
async fn admin_creates_and_student_takes_assessment() {
    let state = test_state();
    let app = app(&state);
    let college = seed_college(&state, "Acme Institute", "admin@acme.edu").await;
    let admin = college_admin_token(&app, "admin@acme.edu").await;
    let (_, student) = signup_student(&app, "Acme Institute", "ada@acme.edu").await;

    let created = create_assessment(&app, &admin, "Linear structures").await;
    assert_eq!(created["collegeId"], college.id.as_str());
    assert_eq!(created["questions"][0]["points"], 2);
    assert_eq!(created["questions"][1]["points"], 1);
    assert_eq!(created["questions"][0]["correctAnswer"], "B");
    let id = created["id"].as_str().expect("id").to_string();
    let (first, second) = question_ids(&created);

    let (status, body) = send_json(
        &app,
        authed_request("GET", &format!("/api/assessments/{id}"), &student),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let questions = body["questions"].as_array().expect("questions");
    assert_eq!(questions.len(), 2);
    assert!(questions.iter().all(|q| q.get("correctAnswer").is_none()));

    let (status, body) = send_json(
        &app,
        authed_json_request(
            "POST",
            &format!("/api/assessments/{id}/attempt"),
            &student,
            json!({ "answers": { first: "B", second: "C" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 2);
    assert_eq!(body["totalPoints"], 3);
    assert_eq!(body["percentage"], 67);
    assert_eq!(body["attempt"]["assessment"]["title"], "Linear structures");

    let (status, body) = send_json(&app, authed_request("GET", "/api/assessments", &admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["_count"]["questions"], 2);
    assert_eq!(body[0]["_count"]["attempts"], 1);

    let (status, body) = send_json(
        &app,
        authed_request("GET", "/api/students/progress", &student),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let attempts = body["assessmentAttempts"].as_array().expect("attempts");
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0]["assessment"]["id"], id.as_str());
}

#[tokio::test]
async fn unanswered_and_unknown_questions_score_zero() {
    let state = test_state();
    let app = app(&state);
    seed_college(&state, "Acme Institute", "admin@acme.edu").await;
    let admin = college_admin_token(&app, "admin@acme.edu").await;
    let (_, student) = signup_student(&app, "Acme Institute", "ada@acme.edu").await;
    let created = create_assessment(&app, &admin, "Linear structures").await;
    let id = created["id"].as_str().expect("id");

    let (status, body) = send_json(
        &app,
        authed_json_request(
            "POST",
            &format!("/api/assessments/{id}/attempt"),
            &student,
            json!({ "answers": { "not-a-question": "A" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 0);
    assert_eq!(body["totalPoints"], 3);
    assert_eq!(body["percentage"], 0);
}

#[tokio::test]
async fn skipped_and_stray_answers_score_zero() {
    let state = test_state();
    let app = app(&state);
    seed_college(&state, "Acme Institute", "admin@acme.edu").await;
    let admin = college_admin_token(&app, "admin@acme.edu").await;
    let (_, student) = signup_student(&app, "Acme Institute", "ada@acme.edu").await;
    let created = create_assessment(&app, &admin, "Linear structures").await;
    let id = created["id"].as_str().expect("id");
    let (first, second) = question_ids(&created);

    let (status, body) = send_json(
        &app,
        authed_json_request(
            "POST",
            &format!("/api/assessments/{id}/attempt"),
            &student,
            json!({ "answers": { first.as_str(): "B", second.as_str(): "" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 2);
    assert_eq!(body["totalPoints"], 3);
    assert_eq!(body["percentage"], 67);
    assert_eq!(body["attempt"]["answers"][second.as_str()], "");

    let (status, body) = send_json(
        &app,
        authed_json_request(
            "POST",
            &format!("/api/assessments/{id}/attempt"),
            &student,
            json!({ "answers": { second.as_str(): "E" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 0);
    assert_eq!(body["totalPoints"], 3);

    let (status, body) = send_json(
        &app,
        authed_request("GET", "/api/students/progress", &student),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assessmentAttempts"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn create_validates_questions() {
    let state = test_state();
    let app = app(&state);
    seed_college(&state, "Acme Institute", "admin@acme.edu").await;
    let admin = college_admin_token(&app, "admin@acme.edu").await;

    let question = |correct: &str, points: i64| {
        json!({
            "question": "Pick one",
            "optionA": "a",
            "optionB": "b",
            "optionC": "c",
            "optionD": "d",
            "correctAnswer": correct,
            "points": points
        })
    };
    let bodies = [
        json!({ "title": "Empty", "questions": [] }),
        json!({ "title": "  ", "questions": [question("A", 1)] }),
        json!({ "title": "Bad letter", "questions": [question("E", 1)] }),
        json!({ "title": "Negative", "questions": [question("A", -3)] }),
        json!({ "title": "Too heavy", "questions": [question("A", 1_001)] }),
        json!({
            "title": "Overflow",
            "questions": [question("A", 3_000_000_000), question("B", 3_000_000_000)]
        }),
    ];
    for body in bodies {
        let (status, response) = send_json(
            &app,
            authed_json_request("POST", "/api/assessments", &admin, body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response["code"], "validation_error");
    }

    let (status, body) = send_json(&app, authed_request("GET", "/api/assessments", &admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn zero_points_default_to_one() {
    let state = test_state();
    let app = app(&state);
    seed_college(&state, "Acme Institute", "admin@acme.edu").await;
    let admin = college_admin_token(&app, "admin@acme.edu").await;

    let (status, body) = send_json(
        &app,
        authed_json_request(
            "POST",
            "/api/assessments",
            &admin,
            json!({
                "title": "Warm-up",
                "questions": [{
                    "question": "2 + 2?",
                    "optionA": "3",
                    "optionB": "4",
                    "optionC": "5",
                    "optionD": "22",
                    "correctAnswer": "B",
                    "points": 0
                }]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["questions"][0]["points"], 1);
}

#[tokio::test]
async fn students_cannot_author_and_admins_cannot_take() {
    let state = test_state();
    let app = app(&state);
    seed_college(&state, "Acme Institute", "admin@acme.edu").await;
    let admin = college_admin_token(&app, "admin@acme.edu").await;
    let (_, student) = signup_student(&app, "Acme Institute", "ada@acme.edu").await;
    let created = create_assessment(&app, &admin, "Linear structures").await;
    let id = created["id"].as_str().expect("id");

    let (status, _) = send_json(
        &app,
        authed_json_request(
            "POST",
            "/api/assessments",
            &student,
            json!({ "title": "Mine", "questions": [] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_json(
        &app,
        authed_request("DELETE", &format!("/api/assessments/{id}"), &student),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_json(
        &app,
        authed_request("GET", &format!("/api/assessments/{id}"), &admin),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send_json(&app, authed_request("GET", "/api/assessments", &student)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn update_and_delete_cascade() {
    let state = test_state();
    let app = app(&state);
    seed_college(&state, "Acme Institute", "admin@acme.edu").await;
    let admin = college_admin_token(&app, "admin@acme.edu").await;
    let (_, student) = signup_student(&app, "Acme Institute", "ada@acme.edu").await;
    let created = create_assessment(&app, &admin, "Linear structures").await;
    let id = created["id"].as_str().expect("id").to_string();
    let (first, _) = question_ids(&created);

    let (status, body) = send_json(
        &app,
        authed_json_request(
            "PUT",
            &format!("/api/assessments/{id}"),
            &admin,
            json!({ "title": "Stacks only" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Stacks only");
    assert_eq!(body["description"], "Stacks and queues");

    let (status, _) = send_json(
        &app,
        authed_json_request(
            "PUT",
            &format!("/api/assessments/{id}"),
            &admin,
            json!({ "title": "" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        authed_json_request(
            "POST",
            &format!("/api/assessments/{id}/attempt"),
            &student,
            json!({ "answers": { first: "B" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &app,
        authed_request("DELETE", &format!("/api/assessments/{id}"), &admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Assessment deleted successfully");

    let (status, body) = send_json(
        &app,
        authed_request("GET", "/api/students/progress", &student),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assessmentAttempts"].as_array().map(Vec::len), Some(0));

    let (status, body) = send_json(
        &app,
        authed_request("GET", &format!("/api/assessments/{id}"), &student),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Assessment not found");
}
