use std::sync::Arc;

use alms_events::{EventBus, Mailer};
use alms_gateway::PaymentGateway;
use alms_storage::SignedUrlCache;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is a pool handle or behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: alms_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Payment gateway used for checkout and verification.
    pub gateway: Arc<dyn PaymentGateway>,
    /// Signed-URL cache in front of object storage.
    pub signed_urls: Arc<SignedUrlCache>,
    /// Direct mail channel for the notification endpoint.
    pub mailer: Arc<dyn Mailer>,
    /// Event bus for activity logging and notification side effects.
    pub event_bus: Arc<EventBus>,
}
