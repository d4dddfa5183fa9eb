//! Route definitions for the `/admin` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{admin, content, settings};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// Roles are enforced by handler extractors: the review queue, inbox and
/// dashboard accept moderators, the rest is admin only.
///
/// ```text
/// GET    /dashboard                      -> dashboard
/// GET    /donations                      -> list_donations
/// GET    /aid-requests                   -> list_aid_requests
/// GET    /aid-requests/{id}              -> get_aid_request
/// POST   /aid-requests/{id}/review       -> review_aid_request
/// GET    /activity                       -> list_activity
/// PUT    /settings/{key}                 -> upsert_setting
/// GET    /contact-submissions            -> list_contact_submissions
/// POST   /contact-submissions/{id}/read  -> mark_contact_read
/// GET    /stories                        -> admin_list_stories
/// POST   /stories                        -> create_story
/// PUT    /stories/{id}                   -> update_story
/// DELETE /stories/{id}                   -> delete_story
/// GET    /testimonials                   -> admin_list_testimonials
/// POST   /testimonials                   -> create_testimonial
/// PUT    /testimonials/{id}              -> update_testimonial
/// DELETE /testimonials/{id}              -> delete_testimonial
/// GET    /users                          -> list_users
/// PUT    /users/{id}/role                -> update_user_role
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/donations", get(admin::list_donations))
        .route("/aid-requests", get(admin::list_aid_requests))
        .route("/aid-requests/{id}", get(admin::get_aid_request))
        .route("/aid-requests/{id}/review", post(admin::review_aid_request))
        .route("/activity", get(admin::list_activity))
        .route("/settings/{key}", put(settings::upsert_setting))
        .route("/contact-submissions", get(admin::list_contact_submissions))
        .route(
            "/contact-submissions/{id}/read",
            post(admin::mark_contact_read),
        )
        .route(
            "/stories",
            get(content::admin_list_stories).post(content::create_story),
        )
        .route(
            "/stories/{id}",
            put(content::update_story).delete(content::delete_story),
        )
        .route(
            "/testimonials",
            get(content::admin_list_testimonials).post(content::create_testimonial),
        )
        .route(
            "/testimonials/{id}",
            put(content::update_testimonial).delete(content::delete_testimonial),
        )
        .route("/users", get(admin::list_users))
        .route("/users/{id}/role", put(admin::update_user_role))
}
