use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::identity::{Identity, Vin};
use crate::record::RecordCategory;

/// Notifications emitted after a mutation commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum LedgerEvent {
    RecorderAuthorized {
        target: Identity,
    },
    RecorderRevoked {
        target: Identity,
    },
    RecordAdded {
        vin: Vin,
        mileage: u64,
        category: RecordCategory,
        recorder: Identity,
    },
}

/// A broadcast receiver for ledger events.
pub type EventStream = broadcast::Receiver<LedgerEvent>;

pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Fan-out channel shared by the registry and the ledger.
///
/// Subscribers only see events emitted after they subscribed. A subscriber that
/// falls more than `capacity` events behind observes `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LedgerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> EventStream {
        self.sender.subscribe()
    }

    /// Deliver an event to every current subscriber.
    pub fn emit(&self, event: LedgerEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No event subscribers; notification dropped");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.emit(LedgerEvent::RecorderAuthorized {
            target: Identity::new("a"),
        });
        bus.emit(LedgerEvent::RecorderRevoked {
            target: Identity::new("a"),
        });

        assert!(matches!(
            rx.recv().await.unwrap(),
            LedgerEvent::RecorderAuthorized { .. }
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            LedgerEvent::RecorderRevoked { .. }
        ));
    }

    #[test]
    fn test_emit_without_subscribers_is_harmless() {
        let bus = EventBus::new(4);
        assert_eq!(bus.subscriber_count(), 0);
        bus.emit(LedgerEvent::RecorderAuthorized {
            target: Identity::new("a"),
        });
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = LedgerEvent::RecordAdded {
            vin: Vin::parse("XYZ999").unwrap(),
            mileage: 1000,
            category: RecordCategory::Maintenance,
            recorder: Identity::new("admin"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "RecordAdded");
        assert_eq!(json["vin"], "XYZ999");
        assert_eq!(json["category"], "Maintenance");
    }
}
