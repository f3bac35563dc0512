/// Common test utilities for integration tests
///
/// Provides a TestContext that connects to a real PostgreSQL database, runs
/// migrations, wipes the tables, and builds the router. Requests are driven
/// in-process with `tower::ServiceExt::oneshot`.
///
/// These tests need `DATABASE_URL` pointing at a disposable database and
/// should run single-threaded (`cargo test -- --ignored --test-threads=1`)
/// because every context creation truncates the tables.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::PgPool;
use taskhub_api::app::{build_router, AppState};
use taskhub_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use tower::ServiceExt as _;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test context: database pool plus a ready-to-call router
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
}

impl TestContext {
    /// Connects, migrates, truncates, and builds the app
    pub async fn new() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set for integration tests"))?;

        let db = PgPool::connect(&database_url).await?;

        // Migrations live at the workspace root
        sqlx::migrate!("../migrations").run(&db).await?;

        // Fresh slate so first-user-becomes-admin is deterministic
        sqlx::query("TRUNCATE TABLE tasks, users CASCADE")
            .execute(&db)
            .await?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
        };

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Ok(TestContext { db, app })
    }

    /// Sends a JSON request and returns (status, parsed body)
    ///
    /// The body value is `Value::Null` for empty responses (e.g. 204).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, value)
    }

    /// Registers a user and returns (status, body); body carries user + token
    pub async fn register(&self, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
            })),
        )
        .await
    }

    /// Logs a user in and returns (status, body)
    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(serde_json::json!({
                "email": email,
                "password": password,
            })),
        )
        .await
    }

    /// Registers a user and returns their bearer token, panicking on failure
    pub async fn register_ok(&self, name: &str, email: &str, password: &str) -> String {
        let (status, body) = self.register(name, email, password).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    /// Creates a task for the given token and returns the task body
    pub async fn create_task(&self, token: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", "/api/v1/tasks", Some(token), Some(body))
            .await
    }
}
