//! Campus platform service library crate.
//!
//! # Purpose
//! Exposes the campus API surface, auth middleware, configuration, grading and
//! curriculum rules, and storage implementations for use by the binary and
//! tests.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod curriculum;
pub mod grading;
pub mod model;
pub mod observability;
pub mod provisioning;
pub mod store;
