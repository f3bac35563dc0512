/// Authentication endpoints
///
/// - `POST /api/v1/auth/register` - create an account, get a token
/// - `POST /api/v1/auth/login` - authenticate, get a token
/// - `GET  /api/v1/auth/me` - current user (bearer token required)
///
/// The first account ever registered becomes an admin; every later account
/// gets the regular role.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use taskhub_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{normalize_email, CreateUser, User, UserRole},
};
use validator::Validate;

use crate::{
    app::{AppState, AuthResponse},
    error::{ApiError, ApiResult},
    extract::ApiJson,
};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    /// Email address (unique, case-insensitive)
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Response wrapper for `GET /auth/me`
#[derive(Debug, serde::Serialize)]
pub struct MeResponse {
    pub user: User,
}

/// Register a new user
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `409 Conflict`: email already registered
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    let email = normalize_email(&req.email);
    let password_hash = password::hash_password(&req.password)?;

    // First user ever becomes admin; everyone after that is a regular user.
    // The unique index on email is the backstop if two registrations race.
    let role = if User::count(&state.db).await? == 0 {
        UserRole::Admin
    } else {
        UserRole::User
    };

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name.trim().to_string(),
            email,
            password_hash,
            role,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User registered");

    let response = AuthResponse::issue(user, state.jwt_secret())?;
    Ok((StatusCode::CREATED, response))
}

/// Login with email and password
///
/// The same 401 body covers both an unknown email and a wrong password, so
/// the endpoint does not confirm which emails are registered.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `401 Unauthorized`: invalid credentials
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &normalize_email(&req.email))
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    AuthResponse::issue(user, state.jwt_secret())
}

/// Returns the authenticated caller's user record
///
/// # Errors
///
/// - `401 Unauthorized`: missing or invalid token
/// - `404 Not Found`: the user behind the token no longer exists
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MeResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(MeResponse { user }))
}
