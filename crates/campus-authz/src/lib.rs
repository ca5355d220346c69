//! Campus authn/authz primitives shared by the platform service and its tools.
//!
//! # Purpose
//! Centralizes the role model, bearer token issue/verify, password hashing and
//! the tenant-scoping policy that decides which rows a caller may touch.
//!
//! # How it fits
//! The platform service mints tokens at login, verifies them in its access
//! control middleware, and asks [`scope_query`] for a [`Scope`] before every
//! store call that reads or writes tenant-owned rows.
//!
//! # Key invariants
//! - Tokens are HS256 only; other algorithms are rejected on verify.
//! - College admins and students are always bound to exactly one college.
//! - A denied scope is reported the same way as a missing row.
//!
//! # Examples
//! ```rust
//! use campus_authz::{Identity, ResourceKind, Role, Scope, scope_query};
//!
//! let student = Identity {
//!     id: "s1".to_string(),
//!     email: "s1@acme.edu".to_string(),
//!     role: Role::Student,
//!     college_id: Some("acme".to_string()),
//! };
//! let scope = scope_query(&student, ResourceKind::Assessment).unwrap();
//! assert_eq!(scope, Scope::College { college_id: "acme".to_string() });
//! ```
//!
//! # Common pitfalls
//! - Filtering rows by hand in handlers instead of passing the [`Scope`] down.
//! - Mixing issuer/audience between issuer and verifier.

mod errors;
mod identity;
mod password;
mod role;
mod scope;
mod token;

pub use errors::{AuthzError, AuthzResult};
pub use identity::Identity;
pub use password::{DEFAULT_BCRYPT_COST, PasswordHasher};
pub use role::Role;
pub use scope::{ResourceKind, Scope, ScopeDenied, scope_query};
pub use token::{CampusClaims, TokenIssuer, TokenVerifier};
