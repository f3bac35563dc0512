/// JWT token generation and validation
///
/// Tokens are signed with HS256 and bind the user's id, email, and role for
/// a fixed one-hour validity window. There is no refresh mechanism: an
/// expired token means the client must log in again. Tokens are never
/// persisted and cannot be revoked before expiry.
///
/// Note that the `role` claim reflects the role at issuance time. Role-gated
/// routes re-resolve the current role from the database (see the admin layer
/// in the API crate), so the claim is informational for those paths.
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::jwt::{create_token, validate_token, Claims};
/// use taskhub_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let claims = Claims::new(Uuid::new_v4(), "a@example.com".to_string(), UserRole::User);
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.sub, claims.sub);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// Token issuer written into every token and required on validation
const ISSUER: &str = "taskhub";

/// How long an issued token stays valid, in seconds
pub const TOKEN_VALIDITY_SECS: i64 = 3600;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token (bad signature, malformed, wrong claims)
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was signed for a different issuer
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// JWT claims
///
/// Standard claims (`iss`, `iat`, `nbf`, `exp`) plus the identity triple
/// `{sub, email, role}` resolved at issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Email at issuance time
    pub email: String,

    /// Role at issuance time
    pub role: UserRole,

    /// Issuer - always "taskhub"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims valid for the standard one-hour window
    pub fn new(user_id: Uuid, email: String, role: UserRole) -> Self {
        Self::with_expiration(user_id, email, role, Duration::seconds(TOKEN_VALIDITY_SECS))
    }

    /// Creates claims with a custom validity window (mainly for tests)
    pub fn with_expiration(
        user_id: Uuid,
        email: String,
        role: UserRole,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            email,
            role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a JWT string
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT and extracts its claims
///
/// Verifies the signature, expiry, not-before, and issuer.
///
/// # Errors
///
/// - `JwtError::Expired` when the validity window has elapsed
/// - `JwtError::InvalidIssuer` when the `iss` claim is not "taskhub"
/// - `JwtError::ValidationError` for bad signatures or malformed tokens
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
