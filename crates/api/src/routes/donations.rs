use axum::routing::get;
use axum::Router;

use crate::handlers::donations;
use crate::state::AppState;

/// Routes mounted at `/donations`.
///
/// ```text
/// GET /mine -> my_donations (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/mine", get(donations::my_donations))
}
