//! Campus HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules and small helpers shared by handlers:
//! presence checks on required body fields and college summary lookups.
pub mod admin;
pub mod assessments;
pub mod colleges;
pub mod error;
pub mod extract;
pub mod openapi;
pub mod progress;
pub mod students;
pub mod superadmin;
pub mod system;
pub mod types;

use crate::api::error::{ApiError, api_internal, api_validation_error};
use crate::app::AppState;
use crate::model::CollegeSummary;
use crate::store::StoreError;

/// Reject the request when any required field is blank.
pub(crate) fn ensure_present(fields: &[&str], message: &str) -> Result<(), ApiError> {
    if fields.iter().any(|field| field.trim().is_empty()) {
        return Err(api_validation_error(message));
    }
    Ok(())
}

/// `{id, name}` of a college, or `None` when it no longer exists.
pub(crate) async fn college_summary(
    state: &AppState,
    college_id: &str,
) -> Result<Option<CollegeSummary>, ApiError> {
    match state.store.get_college(college_id).await {
        Ok(college) => Ok(Some(CollegeSummary::from(&college))),
        Err(StoreError::NotFound(_)) => Ok(None),
        Err(err) => Err(api_internal("Failed to fetch college", &err)),
    }
}
