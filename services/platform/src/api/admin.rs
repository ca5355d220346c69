//! College administration endpoints.
//!
//! # Purpose
//! Lets a college admin inspect the student roster, drill into one student's
//! progress and manage fellow admins of the same college.
//!
//! # Key invariants
//! - Every read and write is confined to the caller's college through
//!   [`scoped`]; other colleges' rows answer 404.
//! - An admin cannot delete their own account (checked before any lookup).
use crate::api::ensure_present;
use crate::api::error::{
    ApiError, api_conflict, api_internal, api_not_found, api_validation_error,
};
use crate::api::extract::ValidatedJson;
use crate::api::types::{
    AdminCreatedResponse, CollegeStats, CreateAccountRequest, MessageResponse,
    StudentProgressReport, StudentRosterEntry, StudentSummary,
};
use crate::app::AppState;
use crate::auth::credentials;
use crate::auth::guard::scoped;
use crate::model::{CollegeAdmin, CollegeAdminView, StudentView, new_id};
use crate::store::StoreError;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use campus_authz::{Identity, ResourceKind};
use chrono::Utc;

#[utoipa::path(
    get,
    path = "/api/admin/students",
    tag = "admin",
    security(("bearer" = [])),
    responses((status = 200, description = "Students of the caller's college", body = [StudentRosterEntry]))
)]
pub(crate) async fn list_students(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<StudentRosterEntry>>, ApiError> {
    let scope = scoped(&identity, ResourceKind::Student, "College not found")?;
    let students = state
        .store
        .list_students(&scope)
        .await
        .map_err(|err| api_internal("Failed to fetch students", &err))?;
    let ids: Vec<String> = students.iter().map(|s| s.id.clone()).collect();
    let counts = state
        .store
        .student_activity_counts(&ids)
        .await
        .map_err(|err| api_internal("Failed to count student activity", &err))?;
    Ok(Json(
        students
            .iter()
            .map(|student| StudentRosterEntry {
                student: StudentView::from(student),
                count: counts.get(&student.id).copied().unwrap_or_default(),
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/students/{student_id}/progress",
    tag = "admin",
    security(("bearer" = [])),
    params(("student_id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Progress and attempts of one student", body = StudentProgressReport),
        (status = 404, description = "Student not in the caller's college")
    )
)]
pub(crate) async fn student_progress(
    Path(student_id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<StudentProgressReport>, ApiError> {
    let student_scope = scoped(&identity, ResourceKind::Student, "Student not found")?;
    let progress_scope = scoped(&identity, ResourceKind::Progress, "Student not found")?;
    let attempt_scope = scoped(&identity, ResourceKind::Attempt, "Student not found")?;
    let student = match state.store.get_student(&student_id, &student_scope).await {
        Ok(student) => student,
        Err(StoreError::NotFound(_)) => return Err(api_not_found("Student not found")),
        Err(err) => return Err(api_internal("Failed to fetch student", &err)),
    };
    let dsa_progress = state
        .store
        .list_progress(&student.id, &progress_scope)
        .await
        .map_err(|err| api_internal("Failed to fetch progress", &err))?;
    let assessment_attempts = state
        .store
        .list_attempts(&student.id, &attempt_scope)
        .await
        .map_err(|err| api_internal("Failed to fetch attempts", &err))?;
    Ok(Json(StudentProgressReport {
        student: StudentSummary {
            id: student.id,
            email: student.email,
            name: student.name,
        },
        dsa_progress,
        assessment_attempts,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/admins",
    tag = "admin",
    security(("bearer" = [])),
    responses((status = 200, description = "Current and legacy admins of the caller's college", body = [CollegeAdminView]))
)]
pub(crate) async fn list_admins(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<CollegeAdminView>>, ApiError> {
    let scope = scoped(&identity, ResourceKind::CollegeAdmin, "College not found")?;
    let admins = state
        .store
        .list_college_admins(&scope)
        .await
        .map_err(|err| api_internal("Failed to fetch admins", &err))?;
    Ok(Json(admins.iter().map(CollegeAdminView::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/admins",
    tag = "admin",
    security(("bearer" = [])),
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Admin created", body = AdminCreatedResponse),
        (status = 409, description = "Email already used by an admin")
    )
)]
pub(crate) async fn create_admin(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(body): ValidatedJson<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AdminCreatedResponse>), ApiError> {
    ensure_present(
        &[body.email.as_str(), body.password.as_str(), body.name.as_str()],
        "Email, password, and name are required",
    )?;
    let scope = scoped(&identity, ResourceKind::CollegeAdmin, "College not found")?;
    let college_id = scope
        .college_id()
        .ok_or_else(|| api_validation_error("College ID is required"))?
        .to_string();

    let existing = state
        .store
        .find_college_admin_by_email(&body.email)
        .await
        .map_err(|err| api_internal("Failed to look up admin", &err))?;
    if existing.is_some() {
        return Err(api_conflict(
            "already_exists",
            "Admin with this email already exists",
        ));
    }

    let password_hash = credentials::hash_password(state.passwords, body.password).await?;
    let admin = CollegeAdmin {
        id: new_id(),
        email: body.email,
        password_hash,
        name: body.name,
        college_id,
        created_at: Utc::now(),
        legacy: false,
    };
    let admin = match state.store.create_college_admin(admin, &scope).await {
        Ok(admin) => admin,
        Err(StoreError::Conflict(_)) => {
            return Err(api_conflict(
                "already_exists",
                "Admin with this email already exists",
            ));
        }
        Err(StoreError::NotFound(_)) => return Err(api_not_found("College not found")),
        Err(err) => return Err(api_internal("Failed to create admin", &err)),
    };
    tracing::info!(admin_id = %admin.id, college_id = %admin.college_id, "college admin created");
    Ok((
        StatusCode::CREATED,
        Json(AdminCreatedResponse {
            message: "Admin created successfully".to_string(),
            admin: CollegeAdminView::from(&admin),
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/admin/admins/{admin_id}",
    tag = "admin",
    security(("bearer" = [])),
    params(("admin_id" = String, Path, description = "Admin id")),
    responses(
        (status = 200, description = "Admin deleted", body = MessageResponse),
        (status = 400, description = "Attempted self-deletion"),
        (status = 404, description = "Admin not in the caller's college")
    )
)]
pub(crate) async fn delete_admin(
    Path(admin_id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<MessageResponse>, ApiError> {
    if admin_id == identity.id {
        return Err(api_validation_error("You cannot delete your own account"));
    }
    let scope = scoped(&identity, ResourceKind::CollegeAdmin, "Admin not found")?;
    match state.store.delete_college_admin(&admin_id, &scope).await {
        Ok(()) => {
            tracing::info!(admin_id = %admin_id, deleted_by = %identity.id, "college admin deleted");
            Ok(Json(MessageResponse::new("Admin deleted successfully")))
        }
        Err(StoreError::NotFound(_)) => Err(api_not_found("Admin not found")),
        Err(err) => Err(api_internal("Failed to delete admin", &err)),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "admin",
    security(("bearer" = [])),
    responses((status = 200, description = "Dashboard totals for the caller's college", body = CollegeStats))
)]
pub(crate) async fn college_stats(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<CollegeStats>, ApiError> {
    let scope = scoped(&identity, ResourceKind::Student, "College not found")?;
    let counts = state
        .store
        .dashboard_counts(&scope)
        .await
        .map_err(|err| api_internal("Failed to compute stats", &err))?;
    Ok(Json(CollegeStats {
        total_students: counts.students,
        total_assessments: counts.assessments,
        total_attempts: counts.attempts,
    }))
}
