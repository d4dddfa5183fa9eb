//! Integration tests for idempotent donation recording.
//!
//! Exercises `DonationRepo::record_completed` against a real database:
//! - First insert credits the cause
//! - Repeated and concurrent inserts with the same reference are no-ops
//! - Stale cause / user ids in metadata are dropped instead of failing
//! - A donation in another currency never credits the cause

use alms_core::donation::DONATION_STATUS_COMPLETED;
use alms_db::models::cause::CreateCause;
use alms_db::models::donation::CreateDonation;
use alms_db::repositories::{CauseRepo, DonationRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_cause(slug: &str) -> CreateCause {
    CreateCause {
        title: "Surgery for Amaka".to_string(),
        slug: slug.to_string(),
        summary: "Kidney transplant".to_string(),
        story: None,
        category: "medical".to_string(),
        image_path: None,
        beneficiary_name: Some("Amaka".to_string()),
        goal_minor: 100_000_000,
        currency: "NGN".to_string(),
        is_urgent: true,
        aid_request_id: None,
    }
}

fn new_donation(reference: &str, cause_id: Option<i64>, amount_minor: i64) -> CreateDonation {
    CreateDonation {
        payment_reference: reference.to_string(),
        gateway_transaction_id: Some("4099260516".to_string()),
        cause_id,
        user_id: None,
        donor_email: "donor@example.com".to_string(),
        donor_name: Some("Ada".to_string()),
        amount_minor,
        currency: "NGN".to_string(),
        is_recurring: false,
        is_anonymous: false,
        message: None,
        status: DONATION_STATUS_COMPLETED.to_string(),
        paid_at: Some(chrono::Utc::now()),
        metadata: serde_json::json!({ "donor_name": "Ada" }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_first_record_credits_the_cause(pool: PgPool) {
    let cause = CauseRepo::create(&pool, &new_cause("amaka")).await.unwrap();

    let recorded = DonationRepo::record_completed(&pool, &new_donation("ref-1", Some(cause.id), 500_000))
        .await
        .unwrap();

    assert!(recorded.created);
    assert_eq!(recorded.donation.cause_id, Some(cause.id));
    assert_eq!(recorded.donation.amount(), 5000.0);

    let cause = CauseRepo::find_by_id(&pool, cause.id).await.unwrap().unwrap();
    assert_eq!(cause.raised_minor, 500_000);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_repeated_reference_is_recorded_once(pool: PgPool) {
    let cause = CauseRepo::create(&pool, &new_cause("repeat")).await.unwrap();
    let input = new_donation("ref-dup", Some(cause.id), 250_000);

    let first = DonationRepo::record_completed(&pool, &input).await.unwrap();
    let second = DonationRepo::record_completed(&pool, &input).await.unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.donation.id, second.donation.id);

    let cause = CauseRepo::find_by_id(&pool, cause.id).await.unwrap().unwrap();
    assert_eq!(cause.raised_minor, 250_000, "cause must be credited once");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_records_credit_once(pool: PgPool) {
    let cause = CauseRepo::create(&pool, &new_cause("race")).await.unwrap();
    let input = new_donation("ref-race", Some(cause.id), 100_000);

    let mut handles = Vec::new();
    for _ in 0..5 {
        let pool = pool.clone();
        let input = input.clone();
        handles.push(tokio::spawn(async move {
            DonationRepo::record_completed(&pool, &input).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        let recorded = handle.await.unwrap().unwrap();
        if recorded.created {
            created += 1;
        }
    }
    assert_eq!(created, 1);

    let cause = CauseRepo::find_by_id(&pool, cause.id).await.unwrap().unwrap();
    assert_eq!(cause.raised_minor, 100_000);

    let rows = DonationRepo::list(&pool, Some(cause.id), 50, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stale_metadata_ids_are_dropped(pool: PgPool) {
    let mut input = new_donation("ref-stale", Some(9_999), 10_000);
    input.user_id = Some(8_888);

    let recorded = DonationRepo::record_completed(&pool, &input).await.unwrap();

    assert!(recorded.created);
    assert_eq!(recorded.donation.cause_id, None);
    assert_eq!(recorded.donation.user_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_foreign_currency_donation_does_not_credit_cause(pool: PgPool) {
    let cause = CauseRepo::create(&pool, &new_cause("naira-only")).await.unwrap();
    let mut input = new_donation("ref-usd", Some(cause.id), 5_000);
    input.currency = "USD".to_string();

    let recorded = DonationRepo::record_completed(&pool, &input).await.unwrap();

    assert!(recorded.created);
    assert_eq!(recorded.donation.currency, "USD");
    let cause = CauseRepo::find_by_id(&pool, cause.id).await.unwrap().unwrap();
    assert_eq!(cause.currency, "NGN");
    assert_eq!(cause.raised_minor, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_public_listing_hides_anonymous_names(pool: PgPool) {
    let cause = CauseRepo::create(&pool, &new_cause("wall")).await.unwrap();

    let mut anonymous = new_donation("ref-anon", Some(cause.id), 10_000);
    anonymous.is_anonymous = true;
    DonationRepo::record_completed(&pool, &anonymous).await.unwrap();
    DonationRepo::record_completed(&pool, &new_donation("ref-named", Some(cause.id), 20_000))
        .await
        .unwrap();

    let wall = DonationRepo::list_public_for_cause(&pool, cause.id, 10, 0)
        .await
        .unwrap();
    let names: Vec<&str> = wall.iter().map(|d| d.donor_name.as_str()).collect();
    assert_eq!(wall.len(), 2);
    assert!(names.contains(&"Anonymous"));
    assert!(names.contains(&"Ada"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_totals_group_by_currency(pool: PgPool) {
    DonationRepo::record_completed(&pool, &new_donation("ref-a", None, 10_000))
        .await
        .unwrap();
    let mut second = new_donation("ref-b", None, 5_000);
    second.donor_email = "other@example.com".to_string();
    second.is_recurring = true;
    DonationRepo::record_completed(&pool, &second).await.unwrap();

    let totals = DonationRepo::totals(&pool).await.unwrap();
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].currency, "NGN");
    assert_eq!(totals[0].total_minor, 15_000);
    assert_eq!(totals[0].donation_count, 2);
    assert_eq!(totals[0].donor_count, 2);
    assert_eq!(totals[0].recurring_count, 1);
}
