//! HTTP-level integration tests for registration, login, token refresh,
//! logout and the profile endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_user, get, get_auth, post_json, post_json_auth, put_json_auth,
    TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

/// Log in via the API and return the JSON body.
async fn login_user(app: axum::Router, email: &str, password: &str) -> serde_json::Value {
    let body = json!({ "email": email, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_creates_donor(pool: PgPool) {
    let harness = common::build_test_harness(pool);
    let mut events = harness.event_bus.subscribe();

    let body = json!({
        "email": "  Ada@Example.com ",
        "password": "a-long-password",
        "full_name": "Ada Obi",
    });
    let response = post_json(harness.app(), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["email"], "ada@example.com");
    assert_eq!(json["user"]["role"], "donor");

    let event = events.try_recv().expect("user.registered should be published");
    assert_eq!(event.event_type, "user.registered");
    assert_eq!(event.payload_str("email"), Some("ada@example.com"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_duplicate_email_conflicts(pool: PgPool) {
    create_user(&pool, "taken@example.com", 3).await;
    let app = common::build_test_app(pool);

    let body = json!({
        "email": "TAKEN@example.com",
        "password": "a-long-password",
        "full_name": "Someone",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_rejects_weak_password(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = json!({ "email": "weak@example.com", "password": "short", "full_name": "W" });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let user = create_user(&pool, "admin@example.com", 1).await;
    let app = common::build_test_app(pool);

    let json = login_user(app, "admin@example.com", TEST_PASSWORD).await;

    assert!(json["access_token"].is_string());
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "admin");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    create_user(&pool, "donor@example.com", 3).await;
    let app = common::build_test_app(pool);

    let body = json!({ "email": "donor@example.com", "password": "incorrect" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_unknown_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = json!({ "email": "nobody@example.com", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Five wrong passwords lock the account, even for the right password.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_lockout(pool: PgPool) {
    create_user(&pool, "locked@example.com", 3).await;
    let harness = common::build_test_harness(pool);

    for _ in 0..5 {
        let body = json!({ "email": "locked@example.com", "password": "incorrect" });
        let response = post_json(harness.app(), "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let body = json!({ "email": "locked@example.com", "password": TEST_PASSWORD });
    let response = post_json(harness.app(), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Refresh / logout
// ---------------------------------------------------------------------------

/// A refresh token is single-use.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_rotates_token(pool: PgPool) {
    create_user(&pool, "rotate@example.com", 3).await;
    let harness = common::build_test_harness(pool);

    let login = login_user(harness.app(), "rotate@example.com", TEST_PASSWORD).await;
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        harness.app(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_ne!(json["refresh_token"], refresh_token.as_str());

    let reuse = post_json(
        harness.app(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(reuse.status(), StatusCode::UNAUTHORIZED);
}

/// Two refreshes racing with the same token: exactly one gets new tokens.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_refresh_redeems_once(pool: PgPool) {
    create_user(&pool, "race@example.com", 3).await;
    let harness = common::build_test_harness(pool);

    let login = login_user(harness.app(), "race@example.com", TEST_PASSWORD).await;
    let body = json!({ "refresh_token": login["refresh_token"] });

    let (first, second) = tokio::join!(
        post_json(harness.app(), "/api/v1/auth/refresh", body.clone()),
        post_json(harness.app(), "/api/v1/auth/refresh", body.clone()),
    );
    let mut statuses = [first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::UNAUTHORIZED]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logout_revokes_sessions(pool: PgPool) {
    create_user(&pool, "bye@example.com", 3).await;
    let harness = common::build_test_harness(pool);

    let login = login_user(harness.app(), "bye@example.com", TEST_PASSWORD).await;
    let access = login["access_token"].as_str().unwrap();
    let refresh_token = login["refresh_token"].as_str().unwrap();

    let response = post_json_auth(harness.app(), "/api/v1/auth/logout", json!({}), access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        harness.app(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me_requires_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/api/v1/auth/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_profile_normalizes_avatar(pool: PgPool) {
    let user = create_user(&pool, "me@example.com", 3).await;
    let harness = common::build_test_harness(pool);
    let token = harness.token_for(&user).await;

    let avatar_url = format!(
        "https://files.test/storage/v1/object/public/avatars/{}/face.png",
        user.id
    );
    let body = json!({ "full_name": "New Name", "avatar_path": avatar_url });
    let response = put_json_auth(harness.app(), "/api/v1/auth/me", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["full_name"], "New Name");
    assert_eq!(json["data"]["avatar_path"], format!("{}/face.png", user.id));

    let response = get_auth(harness.app(), "/api/v1/auth/me", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "me@example.com");
    assert_eq!(json["data"]["role"], "donor");
}
