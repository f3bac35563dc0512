//! # TaskHub Shared Library
//!
//! Shared types and business primitives used by the TaskHub API server.
//!
//! ## Module Organization
//!
//! - `models`: database models (users, tasks)
//! - `auth`: password hashing, JWT issuance/validation, auth context types
//! - `db`: connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
