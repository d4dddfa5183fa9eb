//! Handlers for site settings (`/settings`, `/admin/settings/{key}`).

use alms_core::error::CoreError;
use alms_db::models::site_setting::SiteSetting;
use alms_db::repositories::SiteSettingRepo;
use alms_events::bus::EVENT_SETTING_UPDATED;
use alms_events::PlatformEvent;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum length of a setting key.
const MAX_KEY_LENGTH: usize = 100;

/// Request body for `PUT /admin/settings/{key}`.
#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub value: serde_json::Value,
}

/// GET /api/v1/settings
pub async fn list_settings(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<SiteSetting>>>> {
    let settings = SiteSettingRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// PUT /api/v1/admin/settings/{key}
///
/// Create or replace a setting.
pub async fn upsert_setting(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(key): Path<String>,
    Json(input): Json<UpdateSettingRequest>,
) -> AppResult<Json<DataResponse<SiteSetting>>> {
    validate_key(&key)?;

    let setting = SiteSettingRepo::upsert(&state.pool, &key, &input.value).await?;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_SETTING_UPDATED)
            .with_source("site_setting", setting.id)
            .with_actor(admin.user_id)
            .with_payload(serde_json::json!({ "key": setting.key })),
    );

    Ok(Json(DataResponse { data: setting }))
}

/// Keys are lowercase `[a-z0-9_.]`, at most [`MAX_KEY_LENGTH`] characters.
fn validate_key(key: &str) -> Result<(), AppError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LENGTH
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(format!(
            "Invalid setting key '{key}'"
        ))))
    }
}
