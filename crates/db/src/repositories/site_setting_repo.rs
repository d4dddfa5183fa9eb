//! Repository for the `site_settings` key/value table.

use sqlx::PgPool;

use crate::models::site_setting::SiteSetting;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, key, value, created_at, updated_at";

/// Provides read/upsert operations for site settings.
pub struct SiteSettingRepo;

impl SiteSettingRepo {
    /// List all settings ordered by key.
    pub async fn list(pool: &PgPool) -> Result<Vec<SiteSetting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM site_settings ORDER BY key ASC");
        sqlx::query_as::<_, SiteSetting>(&query).fetch_all(pool).await
    }

    /// Find one setting by key.
    pub async fn find(pool: &PgPool, key: &str) -> Result<Option<SiteSetting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM site_settings WHERE key = $1");
        sqlx::query_as::<_, SiteSetting>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace the value stored under `key`.
    pub async fn upsert(
        pool: &PgPool,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<SiteSetting, sqlx::Error> {
        let query = format!(
            "INSERT INTO site_settings (key, value) VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SiteSetting>(&query)
            .bind(key)
            .bind(value)
            .fetch_one(pool)
            .await
    }
}
