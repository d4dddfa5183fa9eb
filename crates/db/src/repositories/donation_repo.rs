//! Repository for the `donations` table.
//!
//! Completed donations are written through [`DonationRepo::record_completed`],
//! which is idempotent on `payment_reference`: the unique constraint plus
//! `ON CONFLICT DO NOTHING` guarantees one row per gateway transaction even
//! when redirect verification and the webhook race each other.

use alms_core::types::DbId;
use sqlx::PgPool;

use crate::models::donation::{
    CreateDonation, Donation, DonationTotals, PublicDonation, RecordedDonation,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, payment_reference, gateway_transaction_id, cause_id, user_id, \
                       donor_email, donor_name, amount_minor, currency, is_recurring, \
                       is_anonymous, message, status, paid_at, metadata, created_at, updated_at";

/// Provides persistence for donations.
pub struct DonationRepo;

impl DonationRepo {
    /// Insert a verified donation exactly once and credit its cause.
    ///
    /// Runs in a single transaction:
    /// 1. `INSERT ... ON CONFLICT (payment_reference) DO NOTHING`.
    /// 2. If a row was inserted and it is linked to a cause in the same
    ///    currency, add the amount to `causes.raised_minor`.
    /// 3. If nothing was inserted, return the existing row with
    ///    `created = false` and leave the cause untouched.
    ///
    /// `cause_id` / `user_id` are only linked when the referenced rows exist,
    /// so stale checkout metadata cannot fail the insert on a foreign key.
    pub async fn record_completed(
        pool: &PgPool,
        input: &CreateDonation,
    ) -> Result<RecordedDonation, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert = format!(
            "INSERT INTO donations (
                payment_reference, gateway_transaction_id, cause_id, user_id,
                donor_email, donor_name, amount_minor, currency, is_recurring,
                is_anonymous, message, status, paid_at, metadata
             )
             VALUES (
                $1, $2,
                (SELECT id FROM causes WHERE id = $3),
                (SELECT id FROM users WHERE id = $4),
                $5, $6, $7, $8, $9, $10, $11, $12, $13, $14
             )
             ON CONFLICT (payment_reference) DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Donation>(&insert)
            .bind(&input.payment_reference)
            .bind(&input.gateway_transaction_id)
            .bind(input.cause_id)
            .bind(input.user_id)
            .bind(&input.donor_email)
            .bind(&input.donor_name)
            .bind(input.amount_minor)
            .bind(&input.currency)
            .bind(input.is_recurring)
            .bind(input.is_anonymous)
            .bind(&input.message)
            .bind(&input.status)
            .bind(input.paid_at)
            .bind(&input.metadata)
            .fetch_optional(&mut *tx)
            .await?;

        let recorded = match inserted {
            Some(donation) => {
                if let Some(cause_id) = donation.cause_id {
                    let credited = sqlx::query(
                        "UPDATE causes SET raised_minor = raised_minor + $2
                         WHERE id = $1 AND currency = $3",
                    )
                    .bind(cause_id)
                    .bind(donation.amount_minor)
                    .bind(&donation.currency)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                    if credited == 0 {
                        tracing::warn!(
                            reference = %donation.payment_reference,
                            cause_id,
                            currency = %donation.currency,
                            "Donation currency differs from cause currency, cause not credited"
                        );
                    }
                }
                RecordedDonation {
                    donation,
                    created: true,
                }
            }
            None => {
                let select = format!("SELECT {COLUMNS} FROM donations WHERE payment_reference = $1");
                let donation = sqlx::query_as::<_, Donation>(&select)
                    .bind(&input.payment_reference)
                    .fetch_one(&mut *tx)
                    .await?;
                tracing::debug!(
                    reference = %input.payment_reference,
                    donation_id = donation.id,
                    "Donation already recorded for reference"
                );
                RecordedDonation {
                    donation,
                    created: false,
                }
            }
        };

        tx.commit().await?;
        Ok(recorded)
    }

    /// Find a donation by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Donation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM donations WHERE id = $1");
        sqlx::query_as::<_, Donation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a donation by its gateway payment reference.
    pub async fn find_by_reference(
        pool: &PgPool,
        reference: &str,
    ) -> Result<Option<Donation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM donations WHERE payment_reference = $1");
        sqlx::query_as::<_, Donation>(&query)
            .bind(reference)
            .fetch_optional(pool)
            .await
    }

    /// List donations newest first, optionally for one cause.
    pub async fn list(
        pool: &PgPool,
        cause_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Donation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM donations
             WHERE ($1::BIGINT IS NULL OR cause_id = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Donation>(&query)
            .bind(cause_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Donations made by a signed-in donor: linked to the account, or made as
    /// a guest with the account's email.
    pub async fn list_for_donor(
        pool: &PgPool,
        user_id: DbId,
        email: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Donation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM donations
             WHERE user_id = $1 OR donor_email = $2
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Donation>(&query)
            .bind(user_id)
            .bind(email)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Completed donations for a cause's donor wall, anonymised.
    pub async fn list_public_for_cause(
        pool: &PgPool,
        cause_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PublicDonation>, sqlx::Error> {
        sqlx::query_as::<_, PublicDonation>(
            "SELECT id,
                    CASE WHEN is_anonymous OR donor_name IS NULL THEN 'Anonymous'
                         ELSE donor_name END AS donor_name,
                    amount_minor, currency, message, created_at
             FROM donations
             WHERE cause_id = $1 AND status = 'completed'
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(cause_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Completed-donation totals grouped by currency.
    pub async fn totals(pool: &PgPool) -> Result<Vec<DonationTotals>, sqlx::Error> {
        sqlx::query_as::<_, DonationTotals>(
            "SELECT currency,
                    COALESCE(SUM(amount_minor), 0)::BIGINT AS total_minor,
                    COUNT(*) AS donation_count,
                    COUNT(DISTINCT donor_email) AS donor_count,
                    COUNT(*) FILTER (WHERE is_recurring) AS recurring_count
             FROM donations
             WHERE status = 'completed'
             GROUP BY currency
             ORDER BY currency ASC",
        )
        .fetch_all(pool)
        .await
    }
}
