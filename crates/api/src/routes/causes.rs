//! Route definitions for the `/causes` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::causes;
use crate::state::AppState;

/// Routes mounted at `/causes`.
///
/// ```text
/// GET    /                   -> list_causes
/// POST   /                   -> create_cause (admin)
/// GET    /by-slug/{slug}     -> get_cause_by_slug
/// GET    /{id}               -> get_cause
/// PUT    /{id}               -> update_cause (admin)
/// DELETE /{id}               -> delete_cause (admin)
/// GET    /{id}/updates       -> list_treatment_updates
/// POST   /{id}/updates       -> create_treatment_update (staff)
/// GET    /{id}/donations     -> list_cause_donations
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(causes::list_causes).post(causes::create_cause))
        .route("/by-slug/{slug}", get(causes::get_cause_by_slug))
        .route(
            "/{id}",
            get(causes::get_cause)
                .put(causes::update_cause)
                .delete(causes::delete_cause),
        )
        .route(
            "/{id}/updates",
            get(causes::list_treatment_updates).post(causes::create_treatment_update),
        )
        .route("/{id}/donations", get(causes::list_cause_donations))
}
