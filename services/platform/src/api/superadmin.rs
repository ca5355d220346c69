//! Platform administration endpoints.
//!
//! # Purpose
//! Tenant lifecycle (create a college together with its first admin, delete a
//! college with everything it owns) and management of platform admins.
//!
//! # Key invariants
//! - A college never exists without an admin: creation runs through
//!   [`provisioning::create_college_with_admin`].
//! - A platform admin cannot delete their own account.
use crate::api::ensure_present;
use crate::api::error::{
    ApiError, api_conflict, api_internal, api_not_found, api_validation_error,
};
use crate::api::extract::ValidatedJson;
use crate::api::types::{
    CreateAccountRequest, CreateCollegeRequest, CreateCollegeResponse, MessageResponse,
    PlatformStats, SuperAdminCreatedResponse,
};
use crate::app::AppState;
use crate::auth::credentials;
use crate::auth::guard::scoped;
use crate::model::{College, CollegeAdmin, CollegeSummary, PlatformAdmin, PlatformAdminView, new_id};
use crate::provisioning::{self, ProvisionError};
use crate::store::StoreError;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use campus_authz::{Identity, ResourceKind};
use chrono::Utc;

const ADMIN_EMAIL_TAKEN: &str = "Admin with this email already exists";
const COLLEGE_NAME_TAKEN: &str = "College with this name already exists";

#[utoipa::path(
    get,
    path = "/api/superadmin/colleges",
    tag = "superadmin",
    security(("bearer" = [])),
    responses((status = 200, description = "All colleges, newest first", body = [College]))
)]
pub(crate) async fn list_colleges(
    State(state): State<AppState>,
) -> Result<Json<Vec<College>>, ApiError> {
    let colleges = state
        .store
        .list_colleges()
        .await
        .map_err(|err| api_internal("Failed to fetch colleges", &err))?;
    Ok(Json(colleges))
}

#[utoipa::path(
    post,
    path = "/api/superadmin/colleges",
    tag = "superadmin",
    security(("bearer" = [])),
    request_body = CreateCollegeRequest,
    responses(
        (status = 201, description = "College and first admin created", body = CreateCollegeResponse),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "College name or admin email already used")
    )
)]
pub(crate) async fn create_college(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateCollegeRequest>,
) -> Result<(StatusCode, Json<CreateCollegeResponse>), ApiError> {
    ensure_present(
        &[
            body.name.as_str(),
            body.admin_email.as_str(),
            body.admin_password.as_str(),
            body.admin_name.as_str(),
        ],
        "All fields are required",
    )?;
    let name = body.name.trim().to_string();

    let existing = state
        .store
        .find_college_by_name(&name)
        .await
        .map_err(|err| api_internal("Failed to look up college", &err))?;
    if existing.is_some() {
        return Err(api_conflict("already_exists", COLLEGE_NAME_TAKEN));
    }
    let existing_admin = state
        .store
        .find_college_admin_by_email(&body.admin_email)
        .await
        .map_err(|err| api_internal("Failed to look up admin", &err))?;
    if existing_admin.is_some() {
        return Err(api_conflict("already_exists", ADMIN_EMAIL_TAKEN));
    }

    let password_hash = credentials::hash_password(state.passwords, body.admin_password).await?;
    let now = Utc::now();
    let college = College {
        id: new_id(),
        name,
        created_at: now,
    };
    let admin = CollegeAdmin {
        id: new_id(),
        email: body.admin_email,
        password_hash,
        name: body.admin_name,
        college_id: college.id.clone(),
        created_at: now,
        legacy: false,
    };

    match provisioning::create_college_with_admin(&*state.store, college, admin).await {
        Ok((college, admin)) => {
            tracing::info!(college_id = %college.id, admin_id = %admin.id, "college provisioned");
            Ok((
                StatusCode::CREATED,
                Json(CreateCollegeResponse {
                    message: "College created successfully".to_string(),
                    college: CollegeSummary::from(&college),
                }),
            ))
        }
        Err(ProvisionError::Parent(StoreError::Conflict(_))) => {
            Err(api_conflict("already_exists", COLLEGE_NAME_TAKEN))
        }
        Err(ProvisionError::Children {
            source: StoreError::Conflict(_),
            ..
        }) => Err(api_conflict("already_exists", ADMIN_EMAIL_TAKEN)),
        Err(err @ ProvisionError::Parent(_)) => {
            Err(api_internal("Failed to create college", err.store_error()))
        }
        Err(err @ ProvisionError::Children { .. }) => {
            Err(api_internal("Failed to create admin", err.store_error()))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/superadmin/colleges/{id}",
    tag = "superadmin",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "College id")),
    responses(
        (status = 200, description = "College and everything it owns deleted", body = MessageResponse),
        (status = 404, description = "No such college")
    )
)]
pub(crate) async fn delete_college(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<MessageResponse>, ApiError> {
    match state.store.delete_college(&id).await {
        Ok(()) => {
            tracing::info!(college_id = %id, deleted_by = %identity.id, "college deleted");
            Ok(Json(MessageResponse::new("College deleted successfully")))
        }
        Err(StoreError::NotFound(_)) => Err(api_not_found("College not found")),
        Err(err) => Err(api_internal("Failed to delete college", &err)),
    }
}

#[utoipa::path(
    get,
    path = "/api/superadmin/superadmins",
    tag = "superadmin",
    security(("bearer" = [])),
    responses((status = 200, description = "Platform admins, newest first", body = [PlatformAdminView]))
)]
pub(crate) async fn list_superadmins(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlatformAdminView>>, ApiError> {
    let admins = state
        .store
        .list_platform_admins()
        .await
        .map_err(|err| api_internal("Failed to fetch super admins", &err))?;
    Ok(Json(admins.iter().map(PlatformAdminView::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/superadmin/superadmins",
    tag = "superadmin",
    security(("bearer" = [])),
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Platform admin created", body = SuperAdminCreatedResponse),
        (status = 409, description = "Email already used")
    )
)]
pub(crate) async fn create_superadmin(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateAccountRequest>,
) -> Result<(StatusCode, Json<SuperAdminCreatedResponse>), ApiError> {
    ensure_present(
        &[body.email.as_str(), body.password.as_str(), body.name.as_str()],
        "Email, password, and name are required",
    )?;
    let admin = register_platform_admin(&state, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(SuperAdminCreatedResponse {
            message: "Super admin created successfully".to_string(),
            super_admin: PlatformAdminView::from(&admin),
        }),
    ))
}

/// Shared by the HTTP handler and the `create-superadmin` command.
pub async fn register_platform_admin(
    state: &AppState,
    body: CreateAccountRequest,
) -> Result<PlatformAdmin, ApiError> {
    const TAKEN: &str = "Super admin with this email already exists";
    let existing = state
        .store
        .find_platform_admin_by_email(&body.email)
        .await
        .map_err(|err| api_internal("Failed to look up super admin", &err))?;
    if existing.is_some() {
        return Err(api_conflict("already_exists", TAKEN));
    }
    let password_hash = credentials::hash_password(state.passwords, body.password).await?;
    let admin = PlatformAdmin {
        id: new_id(),
        email: body.email,
        password_hash,
        name: body.name,
        created_at: Utc::now(),
    };
    match state.store.create_platform_admin(admin).await {
        Ok(admin) => {
            tracing::info!(admin_id = %admin.id, "platform admin created");
            Ok(admin)
        }
        Err(StoreError::Conflict(_)) => Err(api_conflict("already_exists", TAKEN)),
        Err(err) => Err(api_internal("Failed to create super admin", &err)),
    }
}

#[utoipa::path(
    delete,
    path = "/api/superadmin/superadmins/{super_admin_id}",
    tag = "superadmin",
    security(("bearer" = [])),
    params(("super_admin_id" = String, Path, description = "Platform admin id")),
    responses(
        (status = 200, description = "Platform admin deleted", body = MessageResponse),
        (status = 400, description = "Attempted self-deletion"),
        (status = 404, description = "No such platform admin")
    )
)]
pub(crate) async fn delete_superadmin(
    Path(super_admin_id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<MessageResponse>, ApiError> {
    if super_admin_id == identity.id {
        return Err(api_validation_error(
            "You cannot delete your own SuperAdmin account",
        ));
    }
    match state.store.delete_platform_admin(&super_admin_id).await {
        Ok(()) => {
            tracing::info!(admin_id = %super_admin_id, deleted_by = %identity.id, "platform admin deleted");
            Ok(Json(MessageResponse::new("SuperAdmin deleted successfully")))
        }
        Err(StoreError::NotFound(_)) => Err(api_not_found("SuperAdmin not found")),
        Err(err) => Err(api_internal("Failed to delete super admin", &err)),
    }
}

#[utoipa::path(
    get,
    path = "/api/superadmin/stats",
    tag = "superadmin",
    security(("bearer" = [])),
    responses((status = 200, description = "Platform-wide totals", body = PlatformStats))
)]
pub(crate) async fn platform_stats(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<PlatformStats>, ApiError> {
    let scope = scoped(&identity, ResourceKind::Student, "Not found")?;
    let colleges = state
        .store
        .list_colleges()
        .await
        .map_err(|err| api_internal("Failed to fetch colleges", &err))?;
    let admins = state
        .store
        .list_platform_admins()
        .await
        .map_err(|err| api_internal("Failed to fetch super admins", &err))?;
    let counts = state
        .store
        .dashboard_counts(&scope)
        .await
        .map_err(|err| api_internal("Failed to compute stats", &err))?;
    Ok(Json(PlatformStats {
        total_colleges: colleges.len() as u64,
        total_super_admins: admins.len() as u64,
        total_students: counts.students,
        total_assessments: counts.assessments,
        total_attempts: counts.attempts,
    }))
}
