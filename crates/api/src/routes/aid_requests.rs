//! Route definitions for the `/aid-requests` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::aid_requests;
use crate::state::AppState;

/// Routes mounted at `/aid-requests`.
///
/// ```text
/// POST /      -> submit_aid_request (requires auth)
/// GET  /mine  -> my_aid_requests (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(aid_requests::submit_aid_request))
        .route("/mine", get(aid_requests::my_aid_requests))
}
