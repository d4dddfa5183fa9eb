//! HTTP-level integration tests for aid request submission and review.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_harness, create_cause, create_user, get_auth, post_json,
    post_json_auth, TestApp,
};
use serde_json::json;
use sqlx::PgPool;

fn application(user_id: i64) -> serde_json::Value {
    json!({
        "applicant_name": "Amaka Eze",
        "email": "Amaka@Example.com",
        "title": "Kidney transplant",
        "description": "My mother needs a kidney transplant before the end of the year.",
        "category": "medical",
        "amount_needed": 2_500_000,
        "document_paths": [format!("{user_id}/referral.pdf"), format!("{user_id}/referral.pdf")],
    })
}

/// Submit an application as `token` and return the created row's id.
async fn submit(harness: &TestApp, token: &str, user_id: i64) -> i64 {
    let response = post_json_auth(
        harness.app(),
        "/api/v1/aid-requests",
        application(user_id),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn review(
    harness: &TestApp,
    token: &str,
    id: i64,
    body: serde_json::Value,
) -> axum::response::Response {
    post_json_auth(
        harness.app(),
        &format!("/api/v1/admin/aid-requests/{id}/review"),
        body,
        token,
    )
    .await
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_requires_auth(pool: PgPool) {
    let harness = build_test_harness(pool);

    let response = post_json(harness.app(), "/api/v1/aid-requests", application(1)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_creates_pending_request(pool: PgPool) {
    let user = create_user(&pool, "amaka@example.com", 3).await;
    let harness = build_test_harness(pool);
    let token = harness.token_for(&user).await;
    let mut events = harness.event_bus.subscribe();

    let response = post_json_auth(
        harness.app(),
        "/api/v1/aid-requests",
        application(user.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["email"], "amaka@example.com");
    assert_eq!(json["data"]["amount_needed_minor"], 250_000_000);
    // Duplicate paths collapse to one.
    assert_eq!(json["data"]["document_paths"].as_array().unwrap().len(), 1);

    let event = events.try_recv().unwrap();
    assert_eq!(event.event_type, "aid_request.submitted");

    let response = get_auth(harness.app(), "/api/v1/aid-requests/mine", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

/// Applicants cannot attach files from someone else's folder.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_rejects_foreign_documents(pool: PgPool) {
    let user = create_user(&pool, "amaka@example.com", 3).await;
    let other = create_user(&pool, "other@example.com", 3).await;
    let harness = build_test_harness(pool);
    let token = harness.token_for(&user).await;

    let response = post_json_auth(
        harness.app(),
        "/api/v1/aid-requests",
        application(other.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_validates_fields(pool: PgPool) {
    let user = create_user(&pool, "amaka@example.com", 3).await;
    let harness = build_test_harness(pool);
    let token = harness.token_for(&user).await;

    let mut body = application(user.id);
    body["description"] = json!("too short");
    let response = post_json_auth(harness.app(), "/api/v1/aid-requests", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut body = application(user.id);
    body["category"] = json!("holiday");
    let response = post_json_auth(harness.app(), "/api/v1/aid-requests", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_donor_cannot_review(pool: PgPool) {
    let user = create_user(&pool, "amaka@example.com", 3).await;
    let harness = build_test_harness(pool);
    let token = harness.token_for(&user).await;
    let id = submit(&harness, &token, user.id).await;

    let response = review(&harness, &token, id, json!({ "status": "approved" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Approving with `create_cause` publishes a cause seeded from the request.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approve_and_publish_cause(pool: PgPool) {
    let user = create_user(&pool, "amaka@example.com", 3).await;
    let moderator = create_user(&pool, "mod@example.com", 2).await;
    let harness = build_test_harness(pool);
    let id = submit(&harness, &harness.token_for(&user).await, user.id).await;
    let token = harness.token_for(&moderator).await;
    let mut events = harness.event_bus.subscribe();

    let response = review(
        &harness,
        &token,
        id,
        json!({ "status": "approved", "review_notes": "Verified with hospital", "create_cause": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["aid_request"]["status"], "approved");
    assert_eq!(json["data"]["aid_request"]["reviewed_by"], moderator.id);
    let cause = &json["data"]["cause"];
    assert_eq!(cause["title"], "Kidney transplant");
    assert_eq!(cause["slug"], format!("kidney-transplant-{id}"));
    assert_eq!(cause["goal"], 2_500_000.0);
    assert_eq!(cause["aid_request_id"], id);
    assert_eq!(cause["status"], "active");

    let reviewed = events.try_recv().unwrap();
    assert_eq!(reviewed.event_type, "aid_request.reviewed");
    assert_eq!(reviewed.payload_str("previous_status"), Some("pending"));
    let created = events.try_recv().unwrap();
    assert_eq!(created.event_type, "cause.created");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_cause_only_on_approval(pool: PgPool) {
    let user = create_user(&pool, "amaka@example.com", 3).await;
    let admin = create_user(&pool, "admin@example.com", 1).await;
    let harness = build_test_harness(pool);
    let id = submit(&harness, &harness.token_for(&user).await, user.id).await;
    let token = harness.token_for(&admin).await;

    let response = review(
        &harness,
        &token,
        id,
        json!({ "status": "rejected", "create_cause": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM causes")
        .fetch_one(&harness.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

async fn aid_status(harness: &TestApp, id: i64) -> String {
    sqlx::query_scalar("SELECT status FROM aid_requests WHERE id = $1")
        .bind(id)
        .fetch_one(&harness.pool)
        .await
        .unwrap()
}

async fn cause_count(harness: &TestApp) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM causes")
        .fetch_one(&harness.pool)
        .await
        .unwrap()
}

/// A title with nothing to slug still publishes, under `cause-{id}`.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approve_non_ascii_title_publishes_cause(pool: PgPool) {
    let user = create_user(&pool, "amaka@example.com", 3).await;
    let admin = create_user(&pool, "admin@example.com", 1).await;
    let harness = build_test_harness(pool);
    let id = submit(&harness, &harness.token_for(&user).await, user.id).await;
    sqlx::query("UPDATE aid_requests SET title = '帮助妈妈' WHERE id = $1")
        .bind(id)
        .execute(&harness.pool)
        .await
        .unwrap();
    let token = harness.token_for(&admin).await;

    let response = review(
        &harness,
        &token,
        id,
        json!({ "status": "approved", "create_cause": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["cause"]["slug"], format!("cause-{id}"));
    assert_eq!(json["data"]["cause"]["title"], "帮助妈妈");
    assert_eq!(aid_status(&harness, id).await, "approved");
}

/// If the cause cannot be created the decision is rolled back, so the
/// review can be retried.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_cause_creation_leaves_request_undecided(pool: PgPool) {
    let user = create_user(&pool, "amaka@example.com", 3).await;
    let admin = create_user(&pool, "admin@example.com", 1).await;
    let harness = build_test_harness(pool);
    let id = submit(&harness, &harness.token_for(&user).await, user.id).await;
    // Occupies the slug the approval would derive.
    create_cause(&harness.pool, &format!("Kidney transplant {id}"), 1_000).await;
    let token = harness.token_for(&admin).await;
    let mut events = harness.event_bus.subscribe();

    let response = review(
        &harness,
        &token,
        id,
        json!({ "status": "approved", "create_cause": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(aid_status(&harness, id).await, "pending");
    assert_eq!(cause_count(&harness).await, 1);
    assert!(events.try_recv().is_err(), "nothing is published for a rolled-back review");

    let response = review(&harness, &token, id, json!({ "status": "approved" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(aid_status(&harness, id).await, "approved");
}

/// Decisions are final.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_decided_request_cannot_change(pool: PgPool) {
    let user = create_user(&pool, "amaka@example.com", 3).await;
    let admin = create_user(&pool, "admin@example.com", 1).await;
    let harness = build_test_harness(pool);
    let id = submit(&harness, &harness.token_for(&user).await, user.id).await;
    let token = harness.token_for(&admin).await;

    let response = review(&harness, &token, id, json!({ "status": "under_review" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = review(&harness, &token, id, json!({ "status": "rejected" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = review(&harness, &token, id, json!({ "status": "approved" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Two reviewers deciding at once: one wins, the other gets 409.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_reviews_conflict(pool: PgPool) {
    let user = create_user(&pool, "amaka@example.com", 3).await;
    let admin = create_user(&pool, "admin@example.com", 1).await;
    let moderator = create_user(&pool, "mod@example.com", 2).await;
    let harness = build_test_harness(pool);
    let id = submit(&harness, &harness.token_for(&user).await, user.id).await;
    let admin_token = harness.token_for(&admin).await;
    let mod_token = harness.token_for(&moderator).await;

    let (a, b) = tokio::join!(
        review(&harness, &admin_token, id, json!({ "status": "approved" })),
        review(&harness, &mod_token, id, json!({ "status": "rejected" })),
    );

    let mut statuses = [a.status(), b.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_missing_request_is_404(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", 1).await;
    let harness = build_test_harness(pool);
    let token = harness.token_for(&admin).await;

    let response = review(&harness, &token, 987_654, json!({ "status": "approved" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_queue_filters_by_status(pool: PgPool) {
    let user = create_user(&pool, "amaka@example.com", 3).await;
    let admin = create_user(&pool, "admin@example.com", 1).await;
    let harness = build_test_harness(pool);
    let user_token = harness.token_for(&user).await;
    let first = submit(&harness, &user_token, user.id).await;
    submit(&harness, &user_token, user.id).await;
    let token = harness.token_for(&admin).await;

    review(&harness, &token, first, json!({ "status": "approved" })).await;

    let response = get_auth(
        harness.app(),
        "/api/v1/admin/aid-requests?status=pending",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_ne!(items[0]["id"], first);
}
