//! Route definitions for the `/payments` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// POST /initialize          -> initialize_payment
/// POST /verify/{reference}  -> verify_payment
/// POST /webhook             -> payment_webhook (signature checked)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/initialize", post(payments::initialize_payment))
        .route("/verify/{reference}", post(payments::verify_payment))
        .route("/webhook", post(payments::payment_webhook))
}
