//! Call event bus
//!
//! Fan-out point for call lifecycle notifications. Consumers (a bot-handoff
//! controller, billing, transcription) subscribe without the orchestrator
//! knowing them; a slow or dropped subscriber never propagates failure back
//! to the emitter. Delivery is in-process, ordered, at-most-once.

use tokio::sync::broadcast;

use crate::roles::Role;

/// Default subscriber channel capacity
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// A call lifecycle notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    CallStarted {
        call_id: String,
        room_name: String,
    },
    CallEnded {
        call_id: String,
        room_name: String,
        reason: Option<String>,
    },
    ParticipantJoined {
        call_id: String,
        participant_id: String,
        role: Role,
    },
    ParticipantLeft {
        call_id: String,
        participant_id: String,
        role: Role,
    },
    HandoffRequested {
        call_id: String,
        from: Role,
    },
    HandoffCompleted {
        call_id: String,
        to: Role,
    },
}

/// Broadcast bus for [`CallEvent`]s
///
/// Cloning the bus clones the sender; all clones feed the same subscribers.
#[derive(Debug, Clone)]
pub struct CallEventBus {
    tx: broadcast::Sender<CallEvent>,
}

impl CallEventBus {
    /// Create a bus with the given per-subscriber buffer capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to all subsequent events
    pub fn subscribe(&self) -> broadcast::Receiver<CallEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns the number of subscribers that received it; zero subscribers
    /// is not an error.
    pub fn emit(&self, event: CallEvent) -> usize {
        match self.tx.send(event) {
            Ok(received) => received,
            Err(_) => 0,
        }
    }

    pub fn emit_call_started(&self, call_id: &str, room_name: &str) -> usize {
        self.emit(CallEvent::CallStarted {
            call_id: call_id.to_string(),
            room_name: room_name.to_string(),
        })
    }

    pub fn emit_call_ended(&self, call_id: &str, room_name: &str, reason: Option<&str>) -> usize {
        self.emit(CallEvent::CallEnded {
            call_id: call_id.to_string(),
            room_name: room_name.to_string(),
            reason: reason.map(str::to_string),
        })
    }

    pub fn emit_participant_joined(&self, call_id: &str, participant_id: &str, role: Role) -> usize {
        self.emit(CallEvent::ParticipantJoined {
            call_id: call_id.to_string(),
            participant_id: participant_id.to_string(),
            role,
        })
    }

    pub fn emit_participant_left(&self, call_id: &str, participant_id: &str, role: Role) -> usize {
        self.emit(CallEvent::ParticipantLeft {
            call_id: call_id.to_string(),
            participant_id: participant_id.to_string(),
            role,
        })
    }

    pub fn emit_handoff_requested(&self, call_id: &str, from: Role) -> usize {
        self.emit(CallEvent::HandoffRequested {
            call_id: call_id.to_string(),
            from,
        })
    }

    pub fn emit_handoff_completed(&self, call_id: &str, to: Role) -> usize {
        self.emit(CallEvent::HandoffCompleted {
            call_id: call_id.to_string(),
            to,
        })
    }
}

impl Default for CallEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fan_out_to_multiple_subscribers() {
        let bus = CallEventBus::new(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let delivered = bus.emit_call_started("1", "call_1");
        assert_eq!(delivered, 2);

        let expected = CallEvent::CallStarted {
            call_id: "1".into(),
            room_name: "call_1".into(),
        };
        assert_eq!(rx1.recv().await.unwrap(), expected);
        assert_eq!(rx2.recv().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_emit_without_subscribers() {
        let bus = CallEventBus::new(8);

        assert_eq!(bus.emit_call_ended("1", "call_1", Some("hangup")), 0);
    }

    #[tokio::test]
    async fn test_ordering_preserved_per_subscriber() {
        let bus = CallEventBus::new(8);
        let mut rx = bus.subscribe();

        bus.emit_call_started("1", "call_1");
        bus.emit_participant_joined("1", "driver-1", Role::Driver);
        bus.emit_call_ended("1", "call_1", None);

        assert!(matches!(
            rx.recv().await.unwrap(),
            CallEvent::CallStarted { .. }
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            CallEvent::ParticipantJoined { .. }
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            CallEvent::CallEnded { .. }
        ));
    }

    #[tokio::test]
    async fn test_dropped_subscriber_does_not_fail_emitter() {
        let bus = CallEventBus::new(8);
        let rx = bus.subscribe();
        drop(rx);

        assert_eq!(bus.emit_handoff_requested("1", Role::Bot), 0);
        assert_eq!(bus.emit_handoff_completed("1", Role::Human), 0);
    }
}
