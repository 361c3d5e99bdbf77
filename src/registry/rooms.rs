//! Call/room registry
//!
//! The registry owns the callId to room mapping and the per-call state
//! machine. Entries live in an arena keyed by callId; every mutation for a
//! given call happens under that call's own lock, so room creation and
//! teardown for the same call are mutually exclusive while unrelated calls
//! proceed fully in parallel. The outer map lock is only ever held for
//! get/insert/remove, never across an external platform call.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::config::GatewayConfig;
use crate::error::Result;
use crate::events::inbound::RoomMetadata;
use crate::platform::PlatformClient;
use crate::recording::RecordingController;
use crate::roles::Role;

use super::entry::{CallEntry, CallPhase};

/// Result of applying a participant join
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// Whether the participant was newly added (false on redelivery)
    pub added: bool,
    /// Role recorded for the participant
    pub role: Role,
    /// Whether this join activated the call (driver arrived)
    pub activated: bool,
    /// Room name of the call
    pub room_name: String,
}

/// Result of applying a participant leave
#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    /// Join-time role, present only if the participant was a member
    pub role: Option<Role>,
    /// Whether this leave started call teardown (driver departed)
    pub driver_departed: bool,
    /// Room name of the call
    pub room_name: String,
}

/// Result of tearing down a call
#[derive(Debug, Clone)]
pub struct ClosedCall {
    pub call_id: String,
    pub room_name: String,
    /// Whether the call was still `Active` when teardown began
    pub was_active: bool,
}

/// Registry of active calls and their rooms
pub struct RoomRegistry<P: PlatformClient> {
    config: GatewayConfig,
    platform: Arc<P>,
    recording: Arc<RecordingController<P>>,

    /// Map of callId to call entry
    calls: RwLock<HashMap<String, Arc<Mutex<CallEntry>>>>,
}

impl<P: PlatformClient> RoomRegistry<P> {
    /// Create a new registry
    pub fn new(
        config: GatewayConfig,
        platform: Arc<P>,
        recording: Arc<RecordingController<P>>,
    ) -> Self {
        Self {
            config,
            platform,
            recording,
            calls: RwLock::new(HashMap::new()),
        }
    }

    /// Lock the entry for a callId, creating it if unknown
    ///
    /// Retries when it loses the race against a concurrent teardown: an
    /// entry observed in the `Closed` phase has already been unlinked from
    /// the map, so the next iteration inserts a fresh one.
    async fn lock_or_create(&self, call_id: &str) -> OwnedMutexGuard<CallEntry> {
        loop {
            let entry = {
                let mut calls = self.calls.write().await;
                calls
                    .entry(call_id.to_string())
                    .or_insert_with(|| {
                        Arc::new(Mutex::new(CallEntry::new(
                            call_id,
                            self.config.room_name(call_id),
                        )))
                    })
                    .clone()
            };

            let guard = entry.lock_owned().await;
            if guard.phase != CallPhase::Closed {
                return guard;
            }
        }
    }

    /// Get the entry for a callId without creating it
    async fn get(&self, call_id: &str) -> Option<Arc<Mutex<CallEntry>>> {
        self.calls.read().await.get(call_id).cloned()
    }

    /// Ensure the external room for a call exists, creating it if needed
    ///
    /// Idempotent: concurrent calls for the same callId serialize on the
    /// entry lock, the first provisions the external room (one listing, at
    /// most one create), the rest read the registry. Returns the room name.
    pub async fn create_or_get_room(&self, call_id: &str) -> Result<String> {
        let mut entry = self.lock_or_create(call_id).await;
        let room_name = entry.room_name.clone();

        if entry.provisioned {
            return Ok(room_name);
        }

        let rooms = self.platform.list_rooms().await?;
        if !rooms.iter().any(|r| r.name == room_name) {
            self.platform
                .create_room(
                    &room_name,
                    &RoomMetadata::encode(call_id),
                    self.config.max_participants,
                )
                .await?;
            tracing::info!(call_id = %call_id, room = %room_name, "Room created");
        }

        entry.provisioned = true;
        Ok(room_name)
    }

    /// Record a participant joining a call
    ///
    /// Creates the call entry on first contact. A driver join on a freshly
    /// created call activates it.
    pub async fn participant_joined(&self, call_id: &str, identity: &str, role: Role) -> JoinOutcome {
        let mut entry = self.lock_or_create(call_id).await;

        let added = entry.add_participant(identity, role);
        let activated = added && role == Role::Driver && entry.activate();

        if added {
            tracing::info!(
                call_id = %call_id,
                identity = %identity,
                role = %role,
                participants = entry.participant_count(),
                "Participant joined"
            );
        }

        JoinOutcome {
            added,
            role,
            activated,
            room_name: entry.room_name.clone(),
        }
    }

    /// Record a participant leaving a call
    ///
    /// No-op (None) for unknown callIds. A driver leave on an active call
    /// moves it to `Closing`; the caller is expected to follow up with
    /// [`close_room`](Self::close_room).
    pub async fn participant_left(&self, call_id: &str, identity: &str) -> Option<LeaveOutcome> {
        let entry = self.get(call_id).await?;
        let mut entry = entry.lock_owned().await;
        if entry.phase == CallPhase::Closed {
            return None;
        }

        let role = entry.remove_participant(identity);
        let driver_departed = role == Some(Role::Driver) && entry.begin_close();

        if let Some(role) = role {
            tracing::info!(
                call_id = %call_id,
                identity = %identity,
                role = %role,
                participants = entry.participant_count(),
                "Participant left"
            );
        }

        Some(LeaveOutcome {
            role,
            driver_departed,
            room_name: entry.room_name.clone(),
        })
    }

    /// Join-time role of a current member, if known
    pub async fn participant_role(&self, call_id: &str, identity: &str) -> Option<Role> {
        let entry = self.get(call_id).await?;
        let entry = entry.lock().await;
        entry.participant_role(identity)
    }

    /// Tear down a call: best-effort external cleanup, guaranteed local
    /// removal
    ///
    /// No-op (None) for unknown callIds. Each external step may fail
    /// independently; a failure is logged and teardown proceeds through the
    /// remaining steps. The registry entry is always removed.
    pub async fn close_room(&self, call_id: &str) -> Option<ClosedCall> {
        let entry = self.get(call_id).await?;
        let mut entry = entry.lock_owned().await;
        if entry.phase == CallPhase::Closed {
            return None;
        }

        let was_active = entry.phase == CallPhase::Active;
        entry.phase = CallPhase::Closing;
        let room_name = entry.room_name.clone();

        match self.platform.list_participants(&room_name).await {
            Ok(participants) => {
                for p in participants {
                    if let Err(e) = self
                        .platform
                        .remove_participant(&room_name, &p.identity)
                        .await
                    {
                        tracing::warn!(
                            call_id = %call_id,
                            room = %room_name,
                            identity = %p.identity,
                            error = %e,
                            "Failed to remove participant during teardown"
                        );
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    call_id = %call_id,
                    room = %room_name,
                    error = %e,
                    "Failed to list participants during teardown"
                );
            }
        }

        self.recording.stop(call_id).await;

        if let Err(e) = self.platform.delete_room(&room_name).await {
            tracing::warn!(
                call_id = %call_id,
                room = %room_name,
                error = %e,
                "Failed to delete room during teardown"
            );
        }

        entry.close();
        self.calls.write().await.remove(call_id);
        tracing::info!(call_id = %call_id, room = %room_name, "Call torn down");

        Some(ClosedCall {
            call_id: call_id.to_string(),
            room_name,
            was_active,
        })
    }

    /// Whether a callId is currently tracked
    pub async fn is_tracked(&self, call_id: &str) -> bool {
        self.calls.read().await.contains_key(call_id)
    }

    /// Number of tracked calls
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}
