//! DSA progress tracker endpoints.
//!
//! # Purpose
//! One row per (student, topic), created on the first update and overwritten
//! in place afterwards. The topic list served by [`list_topics`] is the
//! curriculum the front end renders; topics outside it are accepted unless
//! strict topic validation is configured.
use crate::api::error::{ApiError, api_internal, api_not_found, api_validation_error};
use crate::api::extract::ValidatedJson;
use crate::api::types::ProgressRequest;
use crate::app::AppState;
use crate::auth::guard::scoped;
use crate::curriculum::{DSA_TOPICS, Topic, is_known_topic};
use crate::model::{Progress, ProgressUpdate, TopicStatus};
use crate::store::StoreError;
use axum::extract::State;
use axum::{Extension, Json};
use campus_authz::{Identity, ResourceKind};

#[utoipa::path(
    get,
    path = "/api/progress/dsa",
    tag = "progress",
    security(("bearer" = [])),
    responses((status = 200, description = "Own progress, most recently updated first", body = [Progress]))
)]
pub(crate) async fn list_dsa_progress(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Progress>>, ApiError> {
    let scope = scoped(&identity, ResourceKind::Progress, "Student not found")?;
    match state.store.list_progress(&identity.id, &scope).await {
        Ok(rows) => Ok(Json(rows)),
        Err(StoreError::NotFound(_)) => Err(api_not_found("Student not found")),
        Err(err) => Err(api_internal("Failed to fetch progress", &err)),
    }
}

#[utoipa::path(
    post,
    path = "/api/progress/dsa",
    tag = "progress",
    security(("bearer" = [])),
    request_body = ProgressRequest,
    responses(
        (status = 200, description = "Stored progress row", body = Progress),
        (status = 400, description = "Invalid topic, status or percentage")
    )
)]
pub(crate) async fn upsert_dsa_progress(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(body): ValidatedJson<ProgressRequest>,
) -> Result<Json<Progress>, ApiError> {
    let update = validate_progress(&state, &identity, body)?;
    let scope = scoped(&identity, ResourceKind::Progress, "Student not found")?;
    match state.store.upsert_progress(update, &scope).await {
        Ok(row) => {
            tracing::debug!(student_id = %row.student_id, topic = %row.topic, "progress updated");
            Ok(Json(row))
        }
        Err(StoreError::NotFound(_)) => Err(api_not_found("Student not found")),
        Err(err) => Err(api_internal("Failed to update progress", &err)),
    }
}

fn validate_progress(
    state: &AppState,
    identity: &Identity,
    body: ProgressRequest,
) -> Result<ProgressUpdate, ApiError> {
    let topic = body.topic.trim();
    if topic.is_empty() || body.status.trim().is_empty() {
        return Err(api_validation_error("Topic and status are required"));
    }
    let status = TopicStatus::parse(body.status.trim()).ok_or_else(|| {
        api_validation_error("Status must be one of not_started, in_progress, completed")
    })?;
    let progress = body.progress.unwrap_or(0);
    if !(0..=100).contains(&progress) {
        return Err(api_validation_error("Progress must be between 0 and 100"));
    }
    if state.curriculum.strict_topics && !is_known_topic(topic) {
        return Err(api_validation_error("Unknown topic"));
    }
    Ok(ProgressUpdate {
        student_id: identity.id.clone(),
        topic: topic.to_string(),
        status,
        progress: progress as u8,
    })
}

#[utoipa::path(
    get,
    path = "/api/progress/dsa/topics",
    tag = "progress",
    responses((status = 200, description = "Built-in DSA curriculum", body = [Topic]))
)]
pub(crate) async fn list_topics() -> Json<&'static [Topic]> {
    Json(&DSA_TOPICS[..])
}
