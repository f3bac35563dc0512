//! # TaskHub API Server Library
//!
//! Core functionality for the TaskHub API server.
//!
//! ## Modules
//!
//! - `app`: application state, router, and auth layers
//! - `config`: configuration management
//! - `error`: error handling and HTTP response mapping
//! - `extract`: request extractors with structured rejections
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
