//! Campus authentication.
//!
//! # Purpose
//! Groups the signup/login endpoints, the bearer-token middleware and role
//! gates, and blocking-pool wrappers around password hashing. Token and role
//! types live in `campus-authz`.
pub mod credentials;
pub mod guard;
pub mod login;
