//! Student self-service endpoints.
use crate::api::college_summary;
use crate::api::error::{ApiError, api_internal, api_not_found};
use crate::api::types::{ProgressOverview, StudentProfile};
use crate::app::AppState;
use crate::auth::guard::scoped;
use crate::store::StoreError;
use axum::extract::State;
use axum::{Extension, Json};
use campus_authz::{Identity, ResourceKind};

#[utoipa::path(
    get,
    path = "/api/students/profile",
    tag = "students",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Own profile", body = StudentProfile),
        (status = 404, description = "Account no longer exists")
    )
)]
pub(crate) async fn profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<StudentProfile>, ApiError> {
    let scope = scoped(&identity, ResourceKind::Student, "Student not found")?;
    let student = match state.store.get_student(&identity.id, &scope).await {
        Ok(student) => student,
        Err(StoreError::NotFound(_)) => return Err(api_not_found("Student not found")),
        Err(err) => return Err(api_internal("Failed to fetch student", &err)),
    };
    let college = college_summary(&state, &student.college_id).await?;
    Ok(Json(StudentProfile {
        id: student.id,
        email: student.email,
        name: student.name,
        created_at: student.created_at,
        college,
    }))
}

#[utoipa::path(
    get,
    path = "/api/students/progress",
    tag = "students",
    security(("bearer" = [])),
    responses((status = 200, description = "Own DSA progress and attempts", body = ProgressOverview))
)]
pub(crate) async fn progress_overview(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ProgressOverview>, ApiError> {
    let progress_scope = scoped(&identity, ResourceKind::Progress, "Student not found")?;
    let attempt_scope = scoped(&identity, ResourceKind::Attempt, "Student not found")?;
    let dsa_progress = state
        .store
        .list_progress(&identity.id, &progress_scope)
        .await
        .map_err(|err| not_found_or_internal(err, "Failed to fetch progress"))?;
    let assessment_attempts = state
        .store
        .list_attempts(&identity.id, &attempt_scope)
        .await
        .map_err(|err| not_found_or_internal(err, "Failed to fetch attempts"))?;
    Ok(Json(ProgressOverview {
        dsa_progress,
        assessment_attempts,
    }))
}

fn not_found_or_internal(err: StoreError, message: &str) -> ApiError {
    match err {
        StoreError::NotFound(_) => api_not_found("Student not found"),
        other => api_internal(message, &other),
    }
}
