/// Authentication context types for Axum middleware
///
/// The API crate installs two request layers built on these types:
///
/// - a bearer-token layer that validates the JWT and inserts [`AuthContext`]
///   into request extensions, and
/// - a role layer for admin routes that re-resolves the caller's user record
///   from the database and inserts [`CurrentUser`].
///
/// Handlers read them back with Axum's `Extension` extractor:
///
/// ```
/// use axum::Extension;
/// use taskhub_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("caller: {}", auth.email)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{User, UserRole};

use super::jwt::Claims;

/// Identity resolved from a verified bearer token
///
/// Carries the token's claims only; it does NOT prove the user still exists
/// or still holds the embedded role. Role-gated routes must go through the
/// role layer, which checks the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Email from the token claims
    pub email: String,

    /// Role from the token claims (issuance-time snapshot)
    pub role: UserRole,
}

impl AuthContext {
    /// Builds the context from verified claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email.clone(),
            role: claims.role,
        }
    }
}

/// The caller's current user record, freshly loaded from the store
///
/// Only present on role-gated routes, where the role layer has already
/// confirmed the stored role is in the allowed set.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Error type for authentication middleware
///
/// The API crate maps each variant onto its error taxonomy (401/403/500) and
/// renders the standard JSON error envelope.
#[derive(Debug)]
pub enum AuthError {
    /// Missing or non-Bearer Authorization header
    MissingCredentials,

    /// Token validation failed (bad signature, malformed, expired)
    InvalidToken(String),

    /// Token verified but the user no longer exists in the store
    UnknownUser,

    /// Authenticated, but the stored role is not allowed for this route
    InsufficientRole,

    /// Database error during role resolution
    DatabaseError(String),
}

/// Extracts the bearer token from an `Authorization` header
///
/// Fails with `MissingCredentials` when the header is absent or does not use
/// the Bearer scheme.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingCredentials)
}
