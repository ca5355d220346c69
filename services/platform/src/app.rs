//! Campus HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Route groups
//! - public: health, signup/login, college directory, topic catalogue
//! - authenticated: everything else, behind [`auth::guard::authenticate`]
//! - role gated: each group adds [`auth::guard::require_roles`] with its
//!   allow list; `/api/assessments` gates per method because students and
//!   college admins share the paths.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::auth;
use crate::auth::guard::{COLLEGE_ADMIN_ONLY, PLATFORM_ADMIN_ONLY, STUDENT_ONLY};
use crate::config::{AuthConfig, CurriculumConfig};
use crate::observability;
use crate::store::CampusStore;
use anyhow::Context;
use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use campus_authz::{PasswordHasher, TokenIssuer, TokenVerifier};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CampusStore + Send + Sync>,
    pub token_issuer: Arc<TokenIssuer>,
    pub token_verifier: Arc<TokenVerifier>,
    pub passwords: PasswordHasher,
    pub curriculum: CurriculumConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CampusStore + Send + Sync>,
        auth: &AuthConfig,
        curriculum: CurriculumConfig,
    ) -> anyhow::Result<Self> {
        let secret = auth.jwt_secret.as_bytes();
        let token_issuer = TokenIssuer::new(
            secret,
            auth.issuer.clone(),
            auth.audience.clone(),
            auth.token_ttl,
        )
        .context("token issuer")?;
        let token_verifier = TokenVerifier::new(
            secret,
            auth.issuer.clone(),
            auth.audience.clone(),
            auth.leeway_secs,
        )
        .context("token verifier")?;
        Ok(Self {
            store,
            token_issuer: Arc::new(token_issuer),
            token_verifier: Arc::new(token_verifier),
            passwords: PasswordHasher::new(auth.bcrypt_cost),
            curriculum,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
                user_id = tracing::field::Empty
            );
            span.set_parent(parent);
            span
        });

    let public = Router::new()
        .route("/api/health", get(api::system::health))
        .route(
            "/api/auth/student/signup",
            post(auth::login::student_signup),
        )
        .route("/api/auth/student/login", post(auth::login::student_login))
        .route(
            "/api/auth/collegeadmin/login",
            post(auth::login::college_admin_login),
        )
        .route(
            "/api/auth/admin/login",
            post(auth::login::college_admin_login),
        )
        .route(
            "/api/auth/superadmin/login",
            post(auth::login::superadmin_login),
        )
        .route("/api/colleges", get(api::colleges::list_public_colleges))
        .route(
            "/api/colleges/verify/:name",
            get(api::colleges::verify_college),
        )
        .route("/api/progress/dsa/topics", get(api::progress::list_topics));

    let students = Router::new()
        .route("/api/students/profile", get(api::students::profile))
        .route(
            "/api/students/progress",
            get(api::students::progress_overview),
        )
        .route(
            "/api/progress/dsa",
            get(api::progress::list_dsa_progress).post(api::progress::upsert_dsa_progress),
        )
        .route(
            "/api/assessments/:id/attempt",
            post(api::assessments::submit_attempt),
        )
        .route_layer(from_fn_with_state(STUDENT_ONLY, auth::guard::require_roles));

    let assessments = Router::new()
        .route(
            "/api/assessments",
            get(api::assessments::list_assessments).merge(
                post(api::assessments::create_assessment).route_layer(from_fn_with_state(
                    COLLEGE_ADMIN_ONLY,
                    auth::guard::require_roles,
                )),
            ),
        )
        .route(
            "/api/assessments/:id",
            get(api::assessments::get_assessment)
                .route_layer(from_fn_with_state(STUDENT_ONLY, auth::guard::require_roles))
                .merge(
                    put(api::assessments::update_assessment)
                        .delete(api::assessments::delete_assessment)
                        .route_layer(from_fn_with_state(
                            COLLEGE_ADMIN_ONLY,
                            auth::guard::require_roles,
                        )),
                ),
        );

    let college_admin = Router::new()
        .route("/api/admin/students", get(api::admin::list_students))
        .route(
            "/api/admin/students/:student_id/progress",
            get(api::admin::student_progress),
        )
        .route(
            "/api/admin/admins",
            get(api::admin::list_admins).post(api::admin::create_admin),
        )
        .route(
            "/api/admin/admins/:admin_id",
            delete(api::admin::delete_admin),
        )
        .route("/api/admin/stats", get(api::admin::college_stats))
        .route_layer(from_fn_with_state(
            COLLEGE_ADMIN_ONLY,
            auth::guard::require_roles,
        ));

    let platform_admin = Router::new()
        .route(
            "/api/superadmin/colleges",
            get(api::superadmin::list_colleges).post(api::superadmin::create_college),
        )
        .route(
            "/api/superadmin/colleges/:id",
            delete(api::superadmin::delete_college),
        )
        .route(
            "/api/superadmin/superadmins",
            get(api::superadmin::list_superadmins).post(api::superadmin::create_superadmin),
        )
        .route(
            "/api/superadmin/superadmins/:super_admin_id",
            delete(api::superadmin::delete_superadmin),
        )
        .route("/api/superadmin/stats", get(api::superadmin::platform_stats))
        .route_layer(from_fn_with_state(
            PLATFORM_ADMIN_ONLY,
            auth::guard::require_roles,
        ));

    let protected = Router::new()
        .merge(students)
        .merge(assessments)
        .merge(college_admin)
        .merge(platform_admin)
        .route_layer(from_fn_with_state(
            state.clone(),
            auth::guard::authenticate,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs")
                .url("/api/openapi.json", ApiDoc::openapi()),
        )
        .layer(trace_layer)
        .with_state(state)
}
