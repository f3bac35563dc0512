/// Integration tests for the TaskHub API
///
/// End-to-end coverage of the auth and task surfaces against a real
/// PostgreSQL database. Run with:
///
/// ```bash
/// DATABASE_URL=postgresql://localhost/taskhub_test \
/// cargo test -p taskhub-api -- --ignored --test-threads=1
/// ```

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::TestContext;
use serde_json::json;
use taskhub_shared::auth::jwt::{create_token, Claims};
use taskhub_shared::models::user::UserRole;
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn first_user_is_admin_rest_are_users() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.register("Alice", "alice@x.com", "pw123456").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["token"].is_string());
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = ctx.register("Bob", "bob@x.com", "pw123456").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "user");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn duplicate_email_is_conflict_case_insensitive() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx.register("Alice", "alice@x.com", "pw123456").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx.register("Alice Again", "  ALICE@X.COM ", "pw123456").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn register_validation_failures_are_400_with_details() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.register("", "not-an-email", "pw").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn login_and_me_flow() {
    let ctx = TestContext::new().await.unwrap();
    ctx.register_ok("Alice", "alice@x.com", "pw123456").await;

    let (status, body) = ctx.login("alice@x.com", "pw123456").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["email"], "alice@x.com");

    let (status, body) = ctx
        .request("GET", "/api/v1/auth/me", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Alice");
    assert!(body["user"].get("password_hash").is_none());

    // Wrong password and unknown email look identical
    let (status, _) = ctx.login("alice@x.com", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = ctx.login("nobody@x.com", "pw123456").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn missing_and_invalid_tokens_are_unauthorized() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx.request("GET", "/api/v1/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .request("GET", "/api/v1/tasks", Some("not.a.valid.jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Token signed with the right secret but already expired
    let claims = Claims::with_expiration(
        Uuid::new_v4(),
        "ghost@x.com".to_string(),
        UserRole::User,
        Duration::seconds(-120),
    );
    let expired = create_token(&claims, common::TEST_JWT_SECRET).unwrap();
    let (status, _) = ctx
        .request("GET", "/api/v1/tasks", Some(&expired), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn create_task_defaults_and_roundtrip() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.register_ok("Bob", "bob@x.com", "pw123456").await;

    let (status, body) = ctx
        .create_task(&token, json!({"title": "write spec"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["task"]["title"], "write spec");
    assert_eq!(body["task"]["status"], "pending");
    assert!(body["task"]["description"].is_null());

    let id = body["task"]["id"].as_str().unwrap().to_string();

    let (status, fetched) = ctx
        .request("GET", &format!("/api/v1/tasks/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["task"]["title"], "write spec");
    assert_eq!(fetched["task"]["status"], "pending");
    assert_eq!(fetched["task"]["id"], id.as_str());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn create_task_rejects_bad_input() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.register_ok("Bob", "bob@x.com", "pw123456").await;

    let (status, body) = ctx.create_task(&token, json!({"title": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = ctx
        .create_task(&token, json!({"title": "x", "status": "done"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "status");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn list_my_tasks_newest_first() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.register_ok("Bob", "bob@x.com", "pw123456").await;

    for title in ["T1", "T2", "T3"] {
        let (status, _) = ctx.create_task(&token, json!({"title": title})).await;
        assert_eq!(status, StatusCode::CREATED);
        // Distinct created_at values so ordering is observable
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
    }

    let (status, body) = ctx.request("GET", "/api/v1/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let titles: Vec<&str> = body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["T3", "T2", "T1"]);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn update_task_partial_fields() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.register_ok("Bob", "bob@x.com", "pw123456").await;

    let (_, body) = ctx
        .create_task(&token, json!({"title": "draft", "description": "v1"}))
        .await;
    let id = body["task"]["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .request(
            "PUT",
            &format!("/api/v1/tasks/{}", id),
            Some(&token),
            Some(json!({"status": "in-progress"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["status"], "in-progress");
    // Untouched fields stay as they were
    assert_eq!(body["task"]["title"], "draft");
    assert_eq!(body["task"]["description"], "v1");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn ownership_is_blind_not_found() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.register_ok("Alice", "alice@x.com", "pw123456").await;
    let bob = ctx.register_ok("Bob", "bob@x.com", "pw123456").await;

    let (_, body) = ctx.create_task(&bob, json!({"title": "bobs task"})).await;
    let bobs_id = body["task"]["id"].as_str().unwrap().to_string();

    // Owner sees it
    let (status, _) = ctx
        .request("GET", &format!("/api/v1/tasks/{}", bobs_id), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // Alice (authenticated, task exists) gets the same 404 as a random id
    let (status, existing_body) = ctx
        .request("GET", &format!("/api/v1/tasks/{}", bobs_id), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, absent_body) = ctx
        .request(
            "GET",
            &format!("/api/v1/tasks/{}", Uuid::new_v4()),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(existing_body, absent_body);

    // Mutations are blind the same way
    let (status, _) = ctx
        .request(
            "PUT",
            &format!("/api/v1/tasks/{}", bobs_id),
            Some(&alice),
            Some(json!({"title": "hijacked"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/api/v1/tasks/{}", bobs_id),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Bob's task is untouched
    let (status, body) = ctx
        .request("GET", &format!("/api/v1/tasks/{}", bobs_id), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["title"], "bobs task");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn delete_task_returns_no_content() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.register_ok("Bob", "bob@x.com", "pw123456").await;

    let (_, body) = ctx.create_task(&token, json!({"title": "ephemeral"})).await;
    let id = body["task"]["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .request("DELETE", &format!("/api/v1/tasks/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = ctx
        .request("GET", &format!("/api/v1/tasks/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn admin_listing_requires_current_stored_role() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.register_ok("Alice", "alice@x.com", "pw123456").await;
    let bob = ctx.register_ok("Bob", "bob@x.com", "pw123456").await;

    ctx.create_task(&bob, json!({"title": "write spec"})).await;

    // Unauthenticated: 401
    let (status, _) = ctx
        .request("GET", "/api/v1/tasks/admin/all", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Non-admin: 403
    let (status, _) = ctx
        .request("GET", "/api/v1/tasks/admin/all", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin sees Bob's task with owner identity
    let (status, body) = ctx
        .request("GET", "/api/v1/tasks/admin/all", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "write spec");
    assert_eq!(tasks[0]["owner_email"], "bob@x.com");
    assert_eq!(tasks[0]["owner_role"], "user");

    // The role check reads the store, not the token: a token whose role
    // claim says admin but whose stored role is user still gets 403
    let (_, body) = ctx.login("bob@x.com", "pw123456").await;
    let bob_id = Uuid::parse_str(body["user"]["id"].as_str().unwrap()).unwrap();
    let forged_claims = Claims::new(bob_id, "bob@x.com".to_string(), UserRole::Admin);
    let forged = create_token(&forged_claims, common::TEST_JWT_SECRET).unwrap();

    let (status, _) = ctx
        .request("GET", "/api/v1/tasks/admin/all", Some(&forged), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn malformed_path_ids_and_bodies_are_structured_400s() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.register_ok("Bob", "bob@x.com", "pw123456").await;

    // Non-UUID path id: same JSON envelope as every other failure, not
    // axum's plain-text rejection
    let (status, body) = ctx
        .request("GET", "/api/v1/tasks/abc", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].is_string());

    // Type-mismatched body field: 400, not a bare 422
    let (status, body) = ctx.create_task(&token, json!({"title": 123})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = ctx
        .request(
            "PUT",
            &format!("/api/v1/tasks/{}", Uuid::new_v4()),
            Some(&token),
            Some(json!({"status": 7})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn unmatched_routes_and_health() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.request("GET", "/api/v1/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = ctx.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}
