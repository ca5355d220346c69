use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("password hashing error: {0}")]
    Password(#[from] bcrypt::BcryptError),
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("signing secret must not be empty")]
    EmptySecret,
}

pub type AuthzResult<T> = Result<T, AuthzError>;
