/// API route handlers
///
/// - `health`: health check endpoint
/// - `auth`: authentication endpoints (register, login, me)
/// - `tasks`: owner-scoped task CRUD and the admin listing

pub mod auth;
pub mod health;
pub mod tasks;
