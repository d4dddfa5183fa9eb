//! Handlers for the `/donations` resource.

use alms_core::error::CoreError;
use alms_db::models::donation::Donation;
use alms_db::repositories::{DonationRepo, UserRepo};
use axum::extract::{Query, State};
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/donations/mine
///
/// Donations linked to the caller's account, plus guest donations made with
/// the account's email before signing up.
pub async fn my_donations(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Donation>>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;

    let donations = DonationRepo::list_for_donor(
        &state.pool,
        user.id,
        &user.email,
        params.limit(),
        params.offset(),
    )
    .await?;

    Ok(Json(DataResponse { data: donations }))
}
