//! Activity log persistence service.
//!
//! [`ActivityLogger`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and appends every received [`PlatformEvent`] to the `activity_log` table.
//! It runs as a long-lived background task and exits when the bus sender is
//! dropped.

use alms_db::models::activity::{ActivityLogEntry, CreateActivityLog};
use alms_db::repositories::ActivityLogRepo;
use alms_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

/// Background service that writes platform events to the activity log.
pub struct ActivityLogger;

impl ActivityLogger {
    /// Run the logging loop until the channel closes.
    ///
    /// A failed insert is logged and skipped; it never stops the loop.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to write activity log entry"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Activity logger lagged, some events were not logged"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, activity logger shutting down");
                    break;
                }
            }
        }
    }

    /// Append a single event to the `activity_log` table.
    pub async fn persist(
        pool: &DbPool,
        event: &PlatformEvent,
    ) -> Result<ActivityLogEntry, sqlx::Error> {
        let input = CreateActivityLog {
            event_type: event.event_type.clone(),
            entity_type: event.source_entity_type.clone(),
            entity_id: event.source_entity_id,
            actor_user_id: event.actor_user_id,
            details: event.payload.clone(),
        };
        ActivityLogRepo::create(pool, &input).await
    }
}
