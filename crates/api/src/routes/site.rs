//! Public site content routes, merged at the `/api/v1` root.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{contact, content, settings};
use crate::state::AppState;

/// ```text
/// POST /contact       -> submit_contact
/// GET  /stories       -> list_stories (published only)
/// GET  /testimonials  -> list_testimonials (published only)
/// GET  /settings      -> list_settings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contact", post(contact::submit_contact))
        .route("/stories", get(content::list_stories))
        .route("/testimonials", get(content::list_testimonials))
        .route("/settings", get(settings::list_settings))
}
