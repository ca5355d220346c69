//! Request body extraction.
//!
//! `axum::Json` answers malformed bodies with plain-text 400/415/422
//! responses. [`ValidatedJson`] routes every rejection through
//! [`api_validation_error`] so clients always see the `{error, code}` shape.
use crate::api::error::{ApiError, api_validation_error};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidatedJson(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    tracing::debug!(error = %rejection.body_text(), "rejected request body");
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            api_validation_error("Expected a JSON request body")
        }
        other => api_validation_error(&other.body_text()),
    }
}
