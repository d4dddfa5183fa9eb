pub mod admin;
pub mod aid_requests;
pub mod auth;
pub mod causes;
pub mod donations;
pub mod health;
pub mod newsletter;
pub mod notifications;
pub mod payments;
pub mod site;
pub mod storage;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         get, update own profile
///
/// /causes                                          list (?status, category, urgent), create
/// /causes/by-slug/{slug}                           get by slug
/// /causes/{id}                                     get, update, delete
/// /causes/{id}/updates                             list, post treatment update
/// /causes/{id}/donations                           donor wall (anonymised)
///
/// /payments/initialize                             open hosted checkout (POST)
/// /payments/verify/{reference}                     verify + record once (POST)
/// /payments/webhook                                signed gateway callback (POST)
///
/// /donations/mine                                  caller's donations
///
/// /aid-requests                                    submit (POST, auth)
/// /aid-requests/mine                               caller's requests
///
/// /storage/signed-url                              time-limited file URL (POST)
///
/// /notifications/email                             send templated email (staff)
///
/// /newsletter/subscribe                            subscribe (POST)
/// /newsletter/unsubscribe                          unsubscribe (POST)
///
/// /contact                                         contact form (POST)
/// /stories                                         published success stories
/// /testimonials                                    published testimonials
/// /settings                                        site settings
///
/// /admin/dashboard                                 totals and counts
/// /admin/donations                                 list (?cause_id)
/// /admin/aid-requests                              review queue (?status)
/// /admin/aid-requests/{id}                         get
/// /admin/aid-requests/{id}/review                  decide (POST)
/// /admin/activity                                  activity log (?event_type)
/// /admin/settings/{key}                            upsert (PUT)
/// /admin/contact-submissions                       inbox (?unread_only)
/// /admin/contact-submissions/{id}/read             mark read (POST)
/// /admin/stories                                   list all, create
/// /admin/stories/{id}                              update, delete
/// /admin/testimonials                              list all, create
/// /admin/testimonials/{id}                         update, delete
/// /admin/users                                     list
/// /admin/users/{id}/role                           change role (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/causes", causes::router())
        .nest("/payments", payments::router())
        .nest("/donations", donations::router())
        .nest("/aid-requests", aid_requests::router())
        .nest("/storage", storage::router())
        .nest("/notifications", notifications::router())
        .nest("/newsletter", newsletter::router())
        .nest("/admin", admin::router())
        // Contact form, stories, testimonials and settings.
        .merge(site::router())
}
