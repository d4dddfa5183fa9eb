//! HTTP-level integration tests for `POST /notifications/email`.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_harness, create_user, post_json, post_json_auth};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_staff_sends_templated_email(pool: PgPool) {
    let moderator = create_user(&pool, "mod@example.com", 2).await;
    let harness = build_test_harness(pool);
    let token = harness.token_for(&moderator).await;

    let body = json!({
        "type": "donation_receipt",
        "to": "donor@example.com",
        "data": {
            "donor_name": "Ife",
            "amount": "5,000.00",
            "currency": "NGN",
            "reference": "ALMS-abc",
            "cause_title": "Clean water",
        },
    });
    let response = post_json_auth(harness.app(), "/api/v1/notifications/email", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["kind"], "donation_receipt");
    assert_eq!(json["data"]["to"], "donor@example.com");

    let sent = harness.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "donor@example.com");
    assert!(sent[0].text.contains("Ife"));
    assert!(sent[0].text.contains("NGN 5,000.00"));
    assert!(sent[0].text.contains("ALMS-abc"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_email_type_is_rejected(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", 1).await;
    let harness = build_test_harness(pool);
    let token = harness.token_for(&admin).await;

    let body = json!({ "type": "birthday", "to": "donor@example.com" });
    let response = post_json_auth(harness.app(), "/api/v1/notifications/email", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(harness.mailer.sent.lock().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_email_endpoint_is_staff_only(pool: PgPool) {
    let donor = create_user(&pool, "donor@example.com", 3).await;
    let harness = build_test_harness(pool);
    let body = json!({ "type": "welcome", "to": "victim@example.com" });

    let response = post_json(harness.app(), "/api/v1/notifications/email", body.clone()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = harness.token_for(&donor).await;
    let response = post_json_auth(harness.app(), "/api/v1/notifications/email", body, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    assert!(harness.mailer.sent.lock().unwrap().is_empty());
}
