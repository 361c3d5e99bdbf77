//! Call entry and phase types
//!
//! Per-call state stored in the room registry. Transitions are guarded so
//! redelivered lifecycle events cannot move a call backwards.

use std::collections::HashMap;
use std::time::Instant;

use crate::roles::Role;

/// Lifecycle phase of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    /// Known to the registry; no driver yet
    Created,
    /// Driver joined; the call is live
    Active,
    /// Driver left; teardown in progress
    Closing,
    /// Teardown finished; the entry is about to be removed
    Closed,
}

/// Entry for a single call in the registry
#[derive(Debug)]
pub struct CallEntry {
    /// Owning callId
    pub call_id: String,

    /// Derived room name (prefix + callId), fixed at creation
    pub room_name: String,

    /// Current phase
    pub phase: CallPhase,

    /// Whether the external room has been confirmed or created
    pub provisioned: bool,

    /// Current members, identity to role resolved at join time
    pub participants: HashMap<String, Role>,

    /// When the entry was created
    pub created_at: Instant,

    /// When the driver joined, if ever
    pub activated_at: Option<Instant>,
}

impl CallEntry {
    /// Create a new entry in the `Created` phase
    pub fn new(call_id: impl Into<String>, room_name: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            room_name: room_name.into(),
            phase: CallPhase::Created,
            provisioned: false,
            participants: HashMap::new(),
            created_at: Instant::now(),
            activated_at: None,
        }
    }

    /// Add a participant; returns false if the identity is already present
    pub fn add_participant(&mut self, identity: &str, role: Role) -> bool {
        if self.participants.contains_key(identity) {
            return false;
        }
        self.participants.insert(identity.to_string(), role);
        true
    }

    /// Remove a participant, returning their join-time role
    pub fn remove_participant(&mut self, identity: &str) -> Option<Role> {
        self.participants.remove(identity)
    }

    /// Role of a current participant
    pub fn participant_role(&self, identity: &str) -> Option<Role> {
        self.participants.get(identity).copied()
    }

    /// Transition to `Active`; true only on the Created -> Active edge
    pub fn activate(&mut self) -> bool {
        if self.phase == CallPhase::Created {
            self.phase = CallPhase::Active;
            self.activated_at = Some(Instant::now());
            return true;
        }
        false
    }

    /// Transition to `Closing`; true only on the Active -> Closing edge
    pub fn begin_close(&mut self) -> bool {
        if self.phase == CallPhase::Active {
            self.phase = CallPhase::Closing;
            return true;
        }
        false
    }

    /// Transition to `Closed`
    pub fn close(&mut self) {
        self.phase = CallPhase::Closed;
    }

    /// Check if the call is live
    pub fn is_active(&self) -> bool {
        self.phase == CallPhase::Active
    }

    /// Number of current participants
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Time since the entry was created
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }
}
