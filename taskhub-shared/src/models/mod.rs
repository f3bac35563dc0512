/// Database models
///
/// - `user`: user accounts with role and credential hash
/// - `task`: owner-scoped task records

pub mod task;
pub mod user;
