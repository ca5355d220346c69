//! Signup and login endpoints.
//!
//! # Purpose
//! Verifies credentials against the stored bcrypt hashes and mints bearer
//! tokens. Every credential failure answers `401 Invalid credentials` so the
//! response never reveals whether an email is registered.
use crate::api::error::{
    ApiError, api_conflict, api_internal, api_internal_message, api_not_found, api_unauthorized,
};
use crate::api::extract::ValidatedJson;
use crate::api::types::{AuthResponse, AuthUser, LoginRequest, SignupRequest};
use crate::api::{college_summary, ensure_present};
use crate::app::AppState;
use crate::auth::credentials;
use crate::model::{CollegeSummary, Student, new_id};
use crate::observability;
use crate::store::StoreError;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use campus_authz::{Identity, Role};
use chrono::Utc;

const COLLEGE_NOT_FOUND: &str = "College not found. Please check the college name.";

#[utoipa::path(
    post,
    path = "/api/auth/student/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Student registered", body = AuthResponse),
        (status = 400, description = "Missing fields"),
        (status = 404, description = "Unknown college"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn student_signup(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    ensure_present(
        &[
            body.email.as_str(),
            body.password.as_str(),
            body.name.as_str(),
            body.college_name.as_str(),
        ],
        "All fields are required",
    )?;

    let college = state
        .store
        .find_college_by_name(&body.college_name)
        .await
        .map_err(|err| api_internal("Failed to look up college", &err))?
        .ok_or_else(|| api_not_found(COLLEGE_NOT_FOUND))?;

    let existing = state
        .store
        .find_student_by_email(&body.email)
        .await
        .map_err(|err| api_internal("Failed to look up student", &err))?;
    if existing.is_some() {
        return Err(api_conflict("already_exists", "Student already exists"));
    }

    let password_hash = credentials::hash_password(state.passwords, body.password).await?;
    let student = Student {
        id: new_id(),
        email: body.email,
        password_hash,
        name: body.name,
        college_id: college.id.clone(),
        created_at: Utc::now(),
    };
    let student = match state.store.create_student(student).await {
        Ok(student) => student,
        Err(StoreError::Conflict(_)) => {
            return Err(api_conflict("already_exists", "Student already exists"));
        }
        Err(StoreError::NotFound(_)) => return Err(api_not_found(COLLEGE_NOT_FOUND)),
        Err(err) => return Err(api_internal("Failed to create student", &err)),
    };

    let identity = Identity {
        id: student.id.clone(),
        email: student.email.clone(),
        role: Role::Student,
        college_id: Some(student.college_id.clone()),
    };
    let token = mint(&state, &identity)?;
    tracing::info!(student_id = %student.id, college_id = %student.college_id, "student registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Student registered successfully".to_string(),
            token,
            user: AuthUser {
                id: student.id,
                email: student.email,
                name: student.name,
                role: Role::Student.as_str().to_string(),
                college_id: Some(student.college_id),
                college: Some(CollegeSummary::from(&college)),
            },
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/student/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn student_login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    ensure_present(
        &[body.email.as_str(), body.password.as_str()],
        "Email and password are required",
    )?;
    let student = state
        .store
        .find_student_by_email(&body.email)
        .await
        .map_err(|err| api_internal("Failed to look up student", &err))?
        .ok_or_else(|| invalid_credentials(Role::Student))?;
    check_password(&state, Role::Student, body.password, &student.password_hash).await?;

    let identity = Identity {
        id: student.id.clone(),
        email: student.email.clone(),
        role: Role::Student,
        college_id: Some(student.college_id.clone()),
    };
    let college = college_summary(&state, &student.college_id).await?;
    logged_in(&state, identity, student.name, college)
}

#[utoipa::path(
    post,
    path = "/api/auth/collegeadmin/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
/// College admin login. Also mounted at `/api/auth/admin/login` for clients
/// built against the legacy admin accounts, which log in here too.
pub async fn college_admin_login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    ensure_present(
        &[body.email.as_str(), body.password.as_str()],
        "Email and password are required",
    )?;
    let admin = state
        .store
        .find_college_admin_by_email(&body.email)
        .await
        .map_err(|err| api_internal("Failed to look up admin", &err))?
        .ok_or_else(|| invalid_credentials(Role::CollegeAdmin))?;
    check_password(&state, Role::CollegeAdmin, body.password, &admin.password_hash).await?;

    let identity = Identity {
        id: admin.id.clone(),
        email: admin.email.clone(),
        role: Role::CollegeAdmin,
        college_id: Some(admin.college_id.clone()),
    };
    let college = college_summary(&state, &admin.college_id).await?;
    if admin.legacy {
        tracing::debug!(admin_id = %admin.id, "legacy admin logged in");
    }
    logged_in(&state, identity, admin.name, college)
}

#[utoipa::path(
    post,
    path = "/api/auth/superadmin/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn superadmin_login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    ensure_present(
        &[body.email.as_str(), body.password.as_str()],
        "Email and password are required",
    )?;
    let admin = state
        .store
        .find_platform_admin_by_email(&body.email)
        .await
        .map_err(|err| api_internal("Failed to look up admin", &err))?
        .ok_or_else(|| invalid_credentials(Role::PlatformAdmin))?;
    check_password(&state, Role::PlatformAdmin, body.password, &admin.password_hash).await?;

    let identity = Identity {
        id: admin.id.clone(),
        email: admin.email.clone(),
        role: Role::PlatformAdmin,
        college_id: None,
    };
    logged_in(&state, identity, admin.name, None)
}

fn invalid_credentials(role: Role) -> ApiError {
    observability::record_login(role.as_str(), "failure");
    api_unauthorized("Invalid credentials")
}

async fn check_password(
    state: &AppState,
    role: Role,
    password: String,
    hash: &str,
) -> Result<(), ApiError> {
    if credentials::verify_password(state.passwords, password, hash.to_string()).await? {
        Ok(())
    } else {
        Err(invalid_credentials(role))
    }
}

fn mint(state: &AppState, identity: &Identity) -> Result<String, ApiError> {
    state.token_issuer.mint(identity).map_err(|err| {
        tracing::error!(error = %err, "failed to mint token");
        api_internal_message("Failed to issue token")
    })
}

fn logged_in(
    state: &AppState,
    identity: Identity,
    name: String,
    college: Option<CollegeSummary>,
) -> Result<Json<AuthResponse>, ApiError> {
    let token = mint(state, &identity)?;
    observability::record_login(identity.role.as_str(), "success");
    tracing::info!(user_id = %identity.id, role = %identity.role, "login succeeded");
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: AuthUser {
            id: identity.id,
            email: identity.email,
            name,
            role: identity.role.as_str().to_string(),
            college_id: identity.college_id,
            college,
        },
    }))
}
