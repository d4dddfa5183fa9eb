use axum::routing::post;
use axum::Router;

use crate::handlers::storage;
use crate::state::AppState;

/// Routes mounted at `/storage`.
///
/// ```text
/// POST /signed-url -> create_signed_url
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/signed-url", post(storage::create_signed_url))
}
