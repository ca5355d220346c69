mod common;

use axum::http::StatusCode;
use common::{
    PASSWORD, app, college_admin_token, create_assessment, platform_admin_token, seed_college,
    seed_platform_admin, send_json, signup_student, test_state,
};
use http_helpers::{authed_json_request, authed_request, json_request};
use serde_json::json;

#[tokio::test]
async fn create_college_provisions_first_admin() {
    let state = test_state();
    let app = app(&state);
    seed_platform_admin(&state, "root@campus.dev").await;
    let root = platform_admin_token(&app, "root@campus.dev").await;

    let (status, body) = send_json(
        &app,
        authed_json_request(
            "POST",
            "/api/superadmin/colleges",
            &root,
            json!({
                "name": "Acme Institute",
                "adminEmail": "dean@acme.edu",
                "adminPassword": PASSWORD,
                "adminName": "Dean"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["college"]["name"], "Acme Institute");

    let dean = college_admin_token(&app, "dean@acme.edu").await;
    let (status, body) = send_json(&app, authed_request("GET", "/api/admin/admins", &dean)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = send_json(
        &app,
        authed_request("GET", "/api/superadmin/colleges", &root),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn create_college_rejects_taken_name_and_admin_email() {
    let state = test_state();
    let app = app(&state);
    seed_platform_admin(&state, "root@campus.dev").await;
    seed_college(&state, "Acme Institute", "admin@acme.edu").await;
    let root = platform_admin_token(&app, "root@campus.dev").await;

    let (status, body) = send_json(
        &app,
        authed_json_request(
            "POST",
            "/api/superadmin/colleges",
            &root,
            json!({
                "name": "Acme Institute",
                "adminEmail": "other@acme.edu",
                "adminPassword": PASSWORD,
                "adminName": "Other"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "College with this name already exists");

    let (status, body) = send_json(
        &app,
        authed_json_request(
            "POST",
            "/api/superadmin/colleges",
            &root,
            json!({
                "name": "Zenith University",
                "adminEmail": "admin@acme.edu",
                "adminPassword": PASSWORD,
                "adminName": "Copycat"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Admin with this email already exists");

    let (status, body) = send_json(
        &app,
        authed_request("GET", "/api/superadmin/colleges", &root),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn delete_college_cascades_to_accounts() {
    let state = test_state();
    let app = app(&state);
    seed_platform_admin(&state, "root@campus.dev").await;
    let college = seed_college(&state, "Acme Institute", "admin@acme.edu").await;
    signup_student(&app, "Acme Institute", "ada@acme.edu").await;
    let root = platform_admin_token(&app, "root@campus.dev").await;

    let (status, _) = send_json(
        &app,
        authed_request(
            "DELETE",
            &format!("/api/superadmin/colleges/{}", college.id),
            &root,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app,
        authed_request(
            "DELETE",
            &format!("/api/superadmin/colleges/{}", college.id),
            &root,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for (path, email) in [
        ("/api/auth/student/login", "ada@acme.edu"),
        ("/api/auth/collegeadmin/login", "admin@acme.edu"),
    ] {
        let (status, _) = send_json(
            &app,
            json_request("POST", path, json!({ "email": email, "password": PASSWORD })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
    }
}

#[tokio::test]
async fn platform_admin_accounts_are_managed() {
    let state = test_state();
    let app = app(&state);
    let me = seed_platform_admin(&state, "root@campus.dev").await;
    let root = platform_admin_token(&app, "root@campus.dev").await;

    let request = json!({
        "email": "ops@campus.dev",
        "password": PASSWORD,
        "name": "Ops"
    });
    let (status, body) = send_json(
        &app,
        authed_json_request("POST", "/api/superadmin/superadmins", &root, request.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["superAdmin"]["email"], "ops@campus.dev");
    assert!(body["superAdmin"].get("passwordHash").is_none());
    let ops_id = body["superAdmin"]["id"].as_str().expect("id").to_string();

    let (status, body) = send_json(
        &app,
        authed_json_request("POST", "/api/superadmin/superadmins", &root, request),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Super admin with this email already exists");

    let (status, body) = send_json(
        &app,
        authed_request(
            "DELETE",
            &format!("/api/superadmin/superadmins/{}", me.id),
            &root,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You cannot delete your own SuperAdmin account");

    let (status, _) = send_json(
        &app,
        authed_request("DELETE", "/api/superadmin/superadmins/missing", &root),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(
        &app,
        authed_request(
            "DELETE",
            &format!("/api/superadmin/superadmins/{ops_id}"),
            &root,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &app,
        authed_request("GET", "/api/superadmin/superadmins", &root),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn platform_stats_count_everything() {
    let state = test_state();
    let app = app(&state);
    seed_platform_admin(&state, "root@campus.dev").await;
    seed_college(&state, "Acme Institute", "admin@acme.edu").await;
    seed_college(&state, "Zenith University", "admin@zenith.edu").await;
    signup_student(&app, "Acme Institute", "ada@acme.edu").await;
    signup_student(&app, "Zenith University", "zed@zenith.edu").await;
    let admin = college_admin_token(&app, "admin@acme.edu").await;
    create_assessment(&app, &admin, "Linear structures").await;
    let root = platform_admin_token(&app, "root@campus.dev").await;

    let (status, body) = send_json(
        &app,
        authed_request("GET", "/api/superadmin/stats", &root),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "totalColleges": 2,
            "totalSuperAdmins": 1,
            "totalStudents": 2,
            "totalAssessments": 1,
            "totalAttempts": 0
        })
    );
}
