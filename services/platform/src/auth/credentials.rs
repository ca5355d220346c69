//! Password hashing off the async runtime.
//!
//! bcrypt is deliberately slow, so both directions run on the blocking pool.
use crate::api::error::{ApiError, api_internal_message};
use campus_authz::PasswordHasher;

pub async fn hash_password(hasher: PasswordHasher, password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hasher.hash_password(&password))
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "password hashing task failed");
            api_internal_message("Failed to hash password")
        })?
        .map_err(|err| {
            tracing::error!(error = %err, "password hashing failed");
            api_internal_message("Failed to hash password")
        })
}

/// `Ok(false)` on mismatch; a malformed stored hash also reads as a mismatch.
pub async fn verify_password(
    hasher: PasswordHasher,
    password: String,
    hash: String,
) -> Result<bool, ApiError> {
    let outcome = tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "password verification task failed");
            api_internal_message("Failed to verify credentials")
        })?;
    match outcome {
        Ok(matches) => Ok(matches),
        Err(err) => {
            tracing::warn!(error = %err, "stored password hash could not be checked");
            Ok(false)
        }
    }
}
