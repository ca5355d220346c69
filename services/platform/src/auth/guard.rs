//! Request authentication and role gates.
//!
//! # Purpose
//! [`authenticate`] turns a bearer token into an [`Identity`] stored in the
//! request extensions; [`require_roles`] rejects identities whose role is not
//! in a route group's allow list. Both run as axum middleware so handlers
//! only see requests that already passed.
//!
//! # Error mapping
//! - missing, malformed, expired or badly signed token: 401
//! - authenticated but wrong role: 403
//! - row outside the caller's tenant: 404 (see [`scoped`])
use crate::api::error::{ApiError, api_forbidden, api_not_found, api_unauthorized};
use crate::app::AppState;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use campus_authz::{Identity, ResourceKind, Role, Scope, scope_query};

pub const STUDENT_ONLY: &[Role] = &[Role::Student];
pub const COLLEGE_ADMIN_ONLY: &[Role] = &[Role::CollegeAdmin];
pub const PLATFORM_ADMIN_ONLY: &[Role] = &[Role::PlatformAdmin];

pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?;
    let value = value.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token =
        extract_bearer(req.headers()).ok_or_else(|| api_unauthorized("Access token required"))?;
    let claims = state.token_verifier.verify(token).map_err(|err| {
        tracing::debug!(error = %err, "rejected bearer token");
        api_unauthorized("Invalid or expired token")
    })?;
    let identity = claims.identity();
    tracing::Span::current().record("user_id", identity.id.as_str());
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Role gate for a route group. Mount with
/// `from_fn_with_state(STUDENT_ONLY, require_roles)` inside [`authenticate`].
pub async fn require_roles(
    State(allowed): State<&'static [Role]>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = req
        .extensions()
        .get::<Identity>()
        .ok_or_else(|| api_unauthorized("Access token required"))?;
    if !allowed.contains(&identity.role) {
        return Err(api_forbidden("Insufficient permissions"));
    }
    Ok(next.run(req).await)
}

/// Resolve the row filter for `kind`, reporting a denial as not-found.
pub fn scoped(identity: &Identity, kind: ResourceKind, not_found: &str) -> Result<Scope, ApiError> {
    scope_query(identity, kind).map_err(|denied| {
        tracing::debug!(error = %denied, user_id = %identity.id, "scope denied");
        api_not_found(not_found)
    })
}
