//! Settings change notifications for other open views.
//!
//! When settings are saved the floating-ball state and size are broadcast so
//! that every page hosting the button can update without reloading. The bus
//! is a thin wrapper over `tokio::sync::broadcast`; consumers subscribe
//! independently.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::FloatingBallSize;

/// Default channel capacity.
pub const DEFAULT_CAPACITY: usize = 32;

// ============================================================================
// Event Envelope
// ============================================================================

/// Metadata wrapper around a [`SettingsEvent`].
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    /// Unique event identifier (UUIDv7 for temporal ordering).
    pub event_id: Uuid,
    /// Namespaced event type (e.g., `"floating_ball.state"`).
    pub event_type: String,
    /// When the event occurred (UTC).
    pub occurred_at: DateTime<Utc>,
    pub payload: SettingsEvent,
}

impl EventEnvelope {
    pub fn new(event: SettingsEvent) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: event.event_type().to_string(),
            occurred_at: Utc::now(),
            payload: event,
        }
    }
}

// ============================================================================
// Settings Event
// ============================================================================

/// Serialized with an `action` tag matching the extension's message names,
/// e.g. `{"action":"updateFloatingBallState","enabled":true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum SettingsEvent {
    /// Floating button enabled or disabled.
    #[serde(rename = "updateFloatingBallState")]
    FloatingBallState { enabled: bool },
    /// Floating button resized.
    #[serde(rename = "updateFloatingBallSize")]
    FloatingBallSize { size: FloatingBallSize },
    /// Settings were reset to defaults.
    #[serde(rename = "settingsReset")]
    SettingsReset,
}

impl SettingsEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            SettingsEvent::FloatingBallState { .. } => "floating_ball.state",
            SettingsEvent::FloatingBallSize { .. } => "floating_ball.size",
            SettingsEvent::SettingsReset => "settings.reset",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast-based bus distributing settings events to open views.
///
/// Slow receivers that fall behind get a `Lagged` error and miss events;
/// only the latest state matters to the floating button.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers. Dropped silently when nobody listens.
    pub fn emit(&self, event: SettingsEvent) {
        let envelope = EventEnvelope::new(event);
        tracing::debug!(
            subsystem = "settings",
            component = "events",
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            subscriber_count = self.tx.receiver_count(),
            "EventBus emit"
        );
        let _ = self.tx.send(envelope);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_emit_subscribe() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.emit(SettingsEvent::FloatingBallState { enabled: false });

        let envelope = rx.recv().await.unwrap();
        assert_eq!(
            envelope.payload,
            SettingsEvent::FloatingBallState { enabled: false }
        );
        assert_eq!(envelope.event_type, "floating_ball.state");
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(SettingsEvent::FloatingBallSize {
            size: FloatingBallSize::Large,
        });

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert_eq!(e1.event_id, e2.event_id);
        assert_eq!(e1.event_type, "floating_ball.size");
    }

    #[test]
    fn test_event_bus_no_subscribers_ok() {
        let bus = EventBus::default();
        bus.emit(SettingsEvent::SettingsReset);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_serializes_as_extension_message() {
        let json = serde_json::to_value(SettingsEvent::FloatingBallState { enabled: true }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "updateFloatingBallState", "enabled": true})
        );

        let json = serde_json::to_value(SettingsEvent::FloatingBallSize {
            size: FloatingBallSize::Small,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "updateFloatingBallSize", "size": "small"})
        );
    }
}
