//! Public college directory.
//!
//! Used by the signup form before the visitor has a token, so neither route
//! is authenticated and both expose only `{id, name}`.
use crate::api::error::{ApiError, api_internal, api_not_found};
use crate::app::AppState;
use crate::model::CollegeSummary;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

#[utoipa::path(
    get,
    path = "/api/colleges",
    tag = "colleges",
    responses((status = 200, description = "Colleges sorted by name", body = [CollegeSummary]))
)]
pub(crate) async fn list_public_colleges(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let colleges = state
        .store
        .list_colleges()
        .await
        .map_err(|err| api_internal("Failed to fetch colleges", &err))?;
    let mut items: Vec<CollegeSummary> = colleges.iter().map(CollegeSummary::from).collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(([(header::CACHE_CONTROL, "public, max-age=300")], Json(items)))
}

#[utoipa::path(
    get,
    path = "/api/colleges/verify/{name}",
    tag = "colleges",
    params(("name" = String, Path, description = "Exact college name")),
    responses(
        (status = 200, description = "College exists", body = CollegeSummary),
        (status = 404, description = "No college with that name")
    )
)]
pub(crate) async fn verify_college(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<CollegeSummary>, ApiError> {
    let college = state
        .store
        .find_college_by_name(&name)
        .await
        .map_err(|err| api_internal("Failed to look up college", &err))?
        .ok_or_else(|| api_not_found("College not found"))?;
    Ok(Json(CollegeSummary::from(&college)))
}
