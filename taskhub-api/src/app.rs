/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware layers.
///
/// # Router Layout
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /api/v1/
///     ├── /auth/
///     │   ├── POST /register        # Public
///     │   ├── POST /login           # Public
///     │   └── GET  /me              # Bearer token
///     └── /tasks/                   # Bearer token
///         ├── POST   /
///         ├── GET    /
///         ├── GET    /:id
///         ├── PUT    /:id
///         ├── DELETE /:id
///         └── GET    /admin/all     # Bearer token + admin role
/// ```
///
/// Two auth layers gate protected routes: `jwt_auth_layer` validates the
/// bearer token and attaches [`AuthContext`]; `require_admin_layer` then
/// re-resolves the caller's user record from the store so a role change
/// takes effect immediately, not at the next token issuance.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskhub_shared::auth::{
    jwt,
    middleware::{extract_bearer_token, AuthContext, AuthError, CurrentUser},
};
use taskhub_shared::models::user::{User, UserRole};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{config::Config, error::ApiError, routes};

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; `Arc` keeps the clone
/// cheap. Both fields are initialized once at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // /auth/me needs a valid bearer token; register/login do not
    let me_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .merge(me_routes);

    // Admin listing carries the role layer on top of the token layer
    let admin_routes = Router::new()
        .route("/admin/all", get(routes::tasks::admin_list_all))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_admin_layer,
        ));

    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).get(routes::tasks::list_my_tasks),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .merge(admin_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
    };

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", v1_routes)
        .fallback(fallback_handler)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Generic 404 for unmatched routes
async fn fallback_handler() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// Bearer-token authentication layer
///
/// Validates the `Authorization: Bearer <token>` header and injects
/// [`AuthContext`] into request extensions. Rejects with 401 when the header
/// is absent or the token fails verification.
pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(req.headers())?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    let auth_context = AuthContext::from_claims(&claims);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Admin role layer
///
/// Must run after [`jwt_auth_layer`]. Re-resolves the caller's user record
/// from the store rather than trusting the role claim, then injects
/// [`CurrentUser`]. 401 if the user vanished, 403 if the stored role is not
/// admin.
pub async fn require_admin_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized("Missing authentication context".to_string()))?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::UnknownUser)?;

    if user.role != UserRole::Admin {
        return Err(AuthError::InsufficientRole.into());
    }

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// Shape shared by auth responses: the user plus a freshly issued token
#[derive(Debug, serde::Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

impl AuthResponse {
    /// Issues a one-hour token for `user` and pairs it with the record
    pub fn issue(user: User, secret: &str) -> Result<Json<Self>, ApiError> {
        let claims = jwt::Claims::new(user.id, user.email.clone(), user.role);
        let token = jwt::create_token(&claims, secret)?;

        Ok(Json(Self { user, token }))
    }
}
