//! HTTP-level integration tests for the public site endpoints: contact form,
//! newsletter, stories, testimonials and settings.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_harness, create_user, get, get_auth, post_json, post_json_auth,
    put_json_auth,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_contact_submission(pool: PgPool) {
    let harness = build_test_harness(pool);
    let mut events = harness.event_bus.subscribe();

    let body = json!({
        "name": "Kemi",
        "email": "Kemi@Example.com",
        "subject": "Volunteering",
        "message": "How can I help at the next outreach?",
    });
    let response = post_json(harness.app(), "/api/v1/contact", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "kemi@example.com");
    assert_eq!(json["data"]["is_read"], false);

    let event = events.try_recv().unwrap();
    assert_eq!(event.event_type, "contact.submitted");

    let response = post_json(
        harness.app(),
        "/api/v1/contact",
        json!({ "name": "", "email": "bad", "message": "" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Subscribing twice is idempotent and only the first activation is announced.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_newsletter_subscribe_is_idempotent(pool: PgPool) {
    let harness = build_test_harness(pool);
    let mut events = harness.event_bus.subscribe();
    let body = json!({ "email": "Reader@Example.com" });

    let response = post_json(harness.app(), "/api/v1/newsletter/subscribe", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "reader@example.com");
    assert_eq!(json["data"]["is_active"], true);

    let response = post_json(harness.app(), "/api/v1/newsletter/subscribe", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(events.try_recv().unwrap().event_type, "newsletter.subscribed");
    assert!(events.try_recv().is_err());

    let response = post_json(harness.app(), "/api/v1/newsletter/unsubscribe", body.clone()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = post_json(harness.app(), "/api/v1/newsletter/unsubscribe", body.clone()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Coming back reactivates the address.
    post_json(harness.app(), "/api/v1/newsletter/subscribe", body).await;
    assert_eq!(events.try_recv().unwrap().event_type, "newsletter.subscribed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_published_stories_are_public(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", 1).await;
    let harness = build_test_harness(pool);
    let token = harness.token_for(&admin).await;

    for (title, published) in [("Walking again", true), ("Draft", false)] {
        let body = json!({ "title": title, "body": "Story body", "is_published": published });
        let response = post_json_auth(harness.app(), "/api/v1/admin/stories", body, &token).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let json = body_json(get(harness.app(), "/api/v1/stories").await).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Walking again");

    let json = body_json(get_auth(harness.app(), "/api/v1/admin/stories", &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_testimonials_publish_toggle(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", 1).await;
    let harness = build_test_harness(pool);
    let token = harness.token_for(&admin).await;

    let body = json!({ "author_name": "Dr. Okafor", "quote": "Transparent and fast." });
    let response = post_json_auth(harness.app(), "/api/v1/admin/testimonials", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let json = body_json(get(harness.app(), "/api/v1/testimonials").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let uri = format!("/api/v1/admin/testimonials/{id}");
    let response = put_json_auth(harness.app(), &uri, json!({ "is_published": true }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(harness.app(), "/api/v1/testimonials").await).await;
    assert_eq!(json["data"][0]["author_name"], "Dr. Okafor");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_settings_upsert(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", 1).await;
    let harness = build_test_harness(pool);
    let token = harness.token_for(&admin).await;

    let uri = "/api/v1/admin/settings/contact.phone";
    let response = put_json_auth(harness.app(), uri, json!({ "value": "+234 800 000" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = put_json_auth(harness.app(), uri, json!({ "value": "+234 811 111" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(harness.app(), "/api/v1/settings").await).await;
    let settings = json["data"].as_array().unwrap();
    let phone = settings
        .iter()
        .find(|s| s["key"] == "contact.phone")
        .expect("setting should be listed");
    assert_eq!(phone["value"], "+234 811 111");

    let response = put_json_auth(
        harness.app(),
        "/api/v1/admin/settings/Bad-Key",
        json!({ "value": 1 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
