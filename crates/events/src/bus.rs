//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`PlatformEvent`]s.
//! Handlers publish after their database work commits; the activity logger
//! and notification dispatcher consume independently.

use alms_core::types::DbId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

pub const EVENT_USER_REGISTERED: &str = "user.registered";
pub const EVENT_USER_ROLE_CHANGED: &str = "user.role_changed";
pub const EVENT_DONATION_COMPLETED: &str = "donation.completed";
pub const EVENT_CAUSE_CREATED: &str = "cause.created";
pub const EVENT_CAUSE_UPDATED: &str = "cause.updated";
pub const EVENT_CAUSE_DELETED: &str = "cause.deleted";
pub const EVENT_AID_REQUEST_SUBMITTED: &str = "aid_request.submitted";
pub const EVENT_AID_REQUEST_REVIEWED: &str = "aid_request.reviewed";
pub const EVENT_NEWSLETTER_SUBSCRIBED: &str = "newsletter.subscribed";
pub const EVENT_CONTACT_SUBMITTED: &str = "contact.submitted";
pub const EVENT_SETTING_UPDATED: &str = "setting.updated";
pub const EVENT_EMAIL_SENT: &str = "email.sent";

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred on the platform.
///
/// Constructed via [`PlatformEvent::new`] and enriched with the builder
/// methods [`with_source`](PlatformEvent::with_source),
/// [`with_actor`](PlatformEvent::with_actor), and
/// [`with_payload`](PlatformEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"donation.completed"`.
    pub event_type: String,

    /// Optional source entity kind (e.g. `"donation"`, `"cause"`).
    pub source_entity_type: Option<String>,

    /// Optional source entity database id.
    pub source_entity_id: Option<DbId>,

    /// Optional id of the user that triggered the event.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach a source entity to the event.
    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Attach the acting user when there is one (guest actions have none).
    pub fn with_optional_actor(mut self, user_id: Option<DbId>) -> Self {
        self.actor_user_id = user_id;
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Read a string field from the payload.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use alms_events::bus::{EventBus, PlatformEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(PlatformEvent::new("cause.created"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: PlatformEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
