//! Lifecycle event router
//!
//! Entry point for verified webhook events. Dispatch is exactly-once
//! effective: every handler checks registry state before mutating, so
//! redelivered events acknowledge without repeating side effects, and
//! events for unrelated calls dispatch concurrently without contention.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::events::bus::CallEventBus;
use crate::events::inbound::{EventKind, LifecycleEvent, TrackType};
use crate::platform::PlatformClient;
use crate::recording::RecordingController;
use crate::registry::rooms::RoomRegistry;
use crate::registry::tracks::TrackRegistry;
use crate::roles::resolve_role;

/// How a dispatched event was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event was routed to a handler (which may have been a no-op)
    Handled,
    /// The event carried no work: unknown type, missing callId, bad shape
    Ignored,
}

/// Routes lifecycle events into the registries and emits call notifications
pub struct EventRouter<P: PlatformClient> {
    rooms: Arc<RoomRegistry<P>>,
    tracks: Arc<TrackRegistry>,
    recording: Arc<RecordingController<P>>,
    bus: CallEventBus,

    events_handled: AtomicU64,
    events_ignored: AtomicU64,
}

impl<P: PlatformClient> EventRouter<P> {
    /// Create a router over the given registries and bus
    pub fn new(
        rooms: Arc<RoomRegistry<P>>,
        tracks: Arc<TrackRegistry>,
        recording: Arc<RecordingController<P>>,
        bus: CallEventBus,
    ) -> Self {
        Self {
            rooms,
            tracks,
            recording,
            bus,
            events_handled: AtomicU64::new(0),
            events_ignored: AtomicU64::new(0),
        }
    }

    /// Classify and dispatch a decoded lifecycle event
    pub async fn dispatch(&self, event: &LifecycleEvent) -> DispatchOutcome {
        self.handle(event.classify()).await
    }

    /// Dispatch a classified event
    pub async fn handle(&self, kind: EventKind) -> DispatchOutcome {
        match kind {
            EventKind::RoomStarted { call_id } => {
                self.on_room_started(&call_id).await;
            }
            EventKind::ParticipantJoined {
                call_id,
                identity,
                metadata,
            } => {
                self.on_participant_joined(&call_id, &identity, metadata.as_deref())
                    .await;
            }
            EventKind::ParticipantLeft {
                call_id, identity, ..
            } => {
                self.on_participant_left(&call_id, &identity).await;
            }
            EventKind::TrackPublished {
                call_id,
                sid,
                kind,
                identity,
                metadata,
            } => {
                if kind == TrackType::Audio {
                    self.on_track_published(&call_id, &sid, &identity, metadata.as_deref())
                        .await;
                }
            }
            EventKind::TrackUnpublished { sid, kind, .. } => {
                if kind == TrackType::Audio {
                    self.tracks.detach(&sid).await;
                }
            }
            EventKind::RoomFinished { call_id } => {
                self.on_room_finished(&call_id).await;
            }
            EventKind::Ignored => {
                self.events_ignored.fetch_add(1, Ordering::Relaxed);
                return DispatchOutcome::Ignored;
            }
        }

        self.events_handled.fetch_add(1, Ordering::Relaxed);
        DispatchOutcome::Handled
    }

    async fn on_room_started(&self, call_id: &str) {
        if let Err(e) = self.rooms.create_or_get_room(call_id).await {
            tracing::warn!(call_id = %call_id, error = %e, "Room provisioning failed");
        }
    }

    async fn on_participant_joined(&self, call_id: &str, identity: &str, metadata: Option<&str>) {
        let role = resolve_role(identity, metadata);
        let outcome = self.rooms.participant_joined(call_id, identity, role).await;
        if !outcome.added {
            return;
        }

        self.bus.emit_participant_joined(call_id, identity, role);

        if outcome.activated {
            tracing::info!(call_id = %call_id, room = %outcome.room_name, "Call started");
            self.bus.emit_call_started(call_id, &outcome.room_name);
            self.recording.start(call_id).await;
        }
    }

    async fn on_participant_left(&self, call_id: &str, identity: &str) {
        let Some(outcome) = self.rooms.participant_left(call_id, identity).await else {
            return;
        };
        let Some(role) = outcome.role else {
            return;
        };

        self.bus.emit_participant_left(call_id, identity, role);

        if outcome.driver_departed {
            tracing::info!(call_id = %call_id, room = %outcome.room_name, "Call ended");
            self.bus.emit_call_ended(call_id, &outcome.room_name, None);
            self.rooms.close_room(call_id).await;
            self.tracks.detach_call(call_id).await;
        }
    }

    async fn on_track_published(
        &self,
        call_id: &str,
        sid: &str,
        identity: &str,
        metadata: Option<&str>,
    ) {
        // Prefer the role recorded at join time; event metadata is only a
        // fallback when the join was never observed
        let role = match self.rooms.participant_role(call_id, identity).await {
            Some(role) => role,
            None => resolve_role(identity, metadata),
        };

        self.tracks.attach(sid, call_id, identity, role).await;
    }

    async fn on_room_finished(&self, call_id: &str) {
        let closed = self.rooms.close_room(call_id).await;
        self.tracks.detach_call(call_id).await;

        // A room that finished while the call was still live ends the call
        // here; a never-activated room tears down silently
        if let Some(closed) = closed {
            if closed.was_active {
                self.bus
                    .emit_call_ended(call_id, &closed.room_name, Some("room_finished"));
            }
        }
    }

    /// Lifecycle events dispatched with effect
    pub fn events_handled(&self) -> u64 {
        self.events_handled.load(Ordering::Relaxed)
    }

    /// Lifecycle events acknowledged without effect
    pub fn events_ignored(&self) -> u64 {
        self.events_ignored.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering as AtomicOrdering;

    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;
    use crate::audio::frame::AudioFrame;
    use crate::config::GatewayConfig;
    use crate::events::bus::CallEvent;
    use crate::events::inbound::RoomMetadata;
    use crate::platform::mock::MockPlatform;
    use crate::registry::tracks::{Admission, DropReason};
    use crate::roles::Role;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    fn router(platform: Arc<MockPlatform>) -> EventRouter<MockPlatform> {
        let config = GatewayConfig::default();
        let recording = Arc::new(RecordingController::new(config.clone(), platform.clone()));
        let rooms = Arc::new(RoomRegistry::new(
            config.clone(),
            platform,
            recording.clone(),
        ));
        let tracks = Arc::new(TrackRegistry::new(config.forward_capacity));
        let bus = CallEventBus::new(config.event_bus_capacity);
        EventRouter::new(rooms, tracks, recording, bus)
    }

    fn kind_joined(call_id: &str, identity: &str) -> EventKind {
        EventKind::ParticipantJoined {
            call_id: call_id.into(),
            identity: identity.into(),
            metadata: None,
        }
    }

    fn kind_left(call_id: &str, identity: &str) -> EventKind {
        EventKind::ParticipantLeft {
            call_id: call_id.into(),
            identity: identity.into(),
            metadata: None,
        }
    }

    fn kind_track(call_id: &str, sid: &str, identity: &str, track_type: TrackType) -> EventKind {
        EventKind::TrackPublished {
            call_id: call_id.into(),
            sid: sid.into(),
            kind: track_type,
            identity: identity.into(),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_end_to_end_call_lifecycle() {
        init_tracing();
        let platform = Arc::new(MockPlatform::new());
        let router = router(platform.clone());
        let mut events = router.bus.subscribe();

        // room_started: external room provisioned
        router
            .handle(EventKind::RoomStarted {
                call_id: "1".into(),
            })
            .await;
        assert_eq!(platform.create_calls.load(AtomicOrdering::Relaxed), 1);
        assert!(router.rooms.is_tracked("1").await);

        // driver joins: call starts, recording starts
        router.handle(kind_joined("1", "driver-1")).await;
        assert!(matches!(
            events.try_recv().unwrap(),
            CallEvent::ParticipantJoined { role: Role::Driver, .. }
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            CallEvent::CallStarted { .. }
        ));
        assert!(router.recording.is_recording("1").await);

        // driver publishes audio: subsequent frames are admitted
        router
            .handle(kind_track("1", "TR_1", "driver-1", TrackType::Audio))
            .await;
        let frame = AudioFrame::from_pcm(&[12, -8, 4], 16_000, 1);
        assert_eq!(
            router.tracks.admit("TR_1", frame.clone()).await,
            Admission::Forwarded
        );

        // driver leaves: call ends, room and tracks fully removed
        router.handle(kind_left("1", "driver-1")).await;
        assert!(matches!(
            events.try_recv().unwrap(),
            CallEvent::ParticipantLeft { role: Role::Driver, .. }
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            CallEvent::CallEnded { .. }
        ));
        assert!(!router.rooms.is_tracked("1").await);
        assert!(!router.recording.is_recording("1").await);
        assert_eq!(
            router.tracks.admit("TR_1", frame).await,
            Admission::Dropped(DropReason::UnknownTrack)
        );
        assert_eq!(
            platform.deleted_rooms.lock().unwrap().as_slice(),
            ["call_1".to_string()]
        );

        // room_finished afterwards is a no-op on the already-removed call
        router
            .handle(EventKind::RoomFinished {
                call_id: "1".into(),
            })
            .await;
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_ignored_events_have_no_side_effects() {
        let platform = Arc::new(MockPlatform::new());
        let router = router(platform.clone());

        assert_eq!(
            router.handle(EventKind::Ignored).await,
            DispatchOutcome::Ignored
        );
        assert_eq!(router.events_ignored(), 1);
        assert_eq!(platform.create_calls.load(AtomicOrdering::Relaxed), 0);
        assert_eq!(router.rooms.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_video_tracks_are_not_attached() {
        let platform = Arc::new(MockPlatform::new());
        let router = router(platform);

        router.handle(kind_joined("1", "driver-1")).await;
        router
            .handle(kind_track("1", "TR_v", "driver-1", TrackType::Video))
            .await;

        assert!(!router.tracks.contains("TR_v").await);
    }

    #[tokio::test]
    async fn test_bot_track_attaches_but_never_relays() {
        let platform = Arc::new(MockPlatform::new());
        let router = router(platform);

        router.handle(kind_joined("1", "bot-ivr")).await;
        router
            .handle(kind_track("1", "TR_b", "bot-ivr", TrackType::Audio))
            .await;

        assert!(router.tracks.contains("TR_b").await);
        let frame = AudioFrame::from_pcm(&[5, 5], 16_000, 1);
        assert_eq!(
            router.tracks.admit("TR_b", frame).await,
            Admission::Dropped(DropReason::BotAudio)
        );
    }

    #[tokio::test]
    async fn test_track_role_comes_from_membership_not_stale_metadata() {
        let platform = Arc::new(MockPlatform::new());
        let router = router(platform);

        router.handle(kind_joined("1", "driver-1")).await;

        // Stale metadata claims the driver is a bot; the join-time role wins
        router
            .handle(EventKind::TrackPublished {
                call_id: "1".into(),
                sid: "TR_1".into(),
                kind: TrackType::Audio,
                identity: "driver-1".into(),
                metadata: Some(r#"{"role":"bot"}"#.into()),
            })
            .await;

        let stats = router.tracks.track_stats("TR_1").await.unwrap();
        assert_eq!(stats.role, Role::Driver);
    }

    #[tokio::test]
    async fn test_redelivered_join_emits_once() {
        let platform = Arc::new(MockPlatform::new());
        let router = router(platform.clone());
        let mut events = router.bus.subscribe();

        router.handle(kind_joined("1", "driver-1")).await;
        router.handle(kind_joined("1", "driver-1")).await;

        assert!(matches!(
            events.try_recv().unwrap(),
            CallEvent::ParticipantJoined { .. }
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            CallEvent::CallStarted { .. }
        ));
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

        // Recording was requested exactly once
        assert_eq!(platform.started_recordings.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_room_finished_mid_call_emits_call_ended() {
        let platform = Arc::new(MockPlatform::new());
        let router = router(platform);
        let mut events = router.bus.subscribe();

        router.handle(kind_joined("1", "driver-1")).await;
        let _ = events.try_recv();
        let _ = events.try_recv();

        router
            .handle(EventKind::RoomFinished {
                call_id: "1".into(),
            })
            .await;

        match events.try_recv().unwrap() {
            CallEvent::CallEnded { reason, .. } => {
                assert_eq!(reason.as_deref(), Some("room_finished"));
            }
            other => panic!("expected CallEnded, got {:?}", other),
        }
        assert!(!router.rooms.is_tracked("1").await);
    }

    #[tokio::test]
    async fn test_room_finished_without_driver_is_silent() {
        let platform = Arc::new(MockPlatform::new());
        let router = router(platform);
        let mut events = router.bus.subscribe();

        // Only a human ever joined; no call started
        router.handle(kind_joined("1", "alice")).await;
        let _ = events.try_recv();

        router
            .handle(EventKind::RoomFinished {
                call_id: "1".into(),
            })
            .await;

        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
        assert!(!router.rooms.is_tracked("1").await);
    }

    #[tokio::test]
    async fn test_leave_for_unknown_call_is_noop() {
        let platform = Arc::new(MockPlatform::new());
        let router = router(platform);
        let mut events = router.bus.subscribe();

        assert_eq!(
            router.handle(kind_left("ghost", "driver-1")).await,
            DispatchOutcome::Handled
        );
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_provisioning_failure_is_not_fatal() {
        let platform = Arc::new(MockPlatform::new());
        platform.fail_create.store(true, AtomicOrdering::Relaxed);
        let router = router(platform);

        let outcome = router
            .handle(EventKind::RoomStarted {
                call_id: "1".into(),
            })
            .await;

        assert_eq!(outcome, DispatchOutcome::Handled);
        // The call is still tracked locally and later events keep flowing
        assert!(router.rooms.is_tracked("1").await);
        router.handle(kind_joined("1", "driver-1")).await;
        assert_eq!(
            router.rooms.participant_role("1", "driver-1").await,
            Some(Role::Driver)
        );
    }

    #[tokio::test]
    async fn test_full_event_decode_dispatch() {
        let platform = Arc::new(MockPlatform::new());
        let router = router(platform);

        let event = LifecycleEvent {
            event: "participant_joined".into(),
            room: Some(crate::events::inbound::RoomPayload {
                name: Some("call_7".into()),
                metadata: Some(RoomMetadata::encode("7")),
            }),
            participant: Some(crate::events::inbound::ParticipantPayload {
                identity: "driver-7".into(),
                metadata: None,
            }),
            track: None,
        };

        assert_eq!(router.dispatch(&event).await, DispatchOutcome::Handled);
        assert!(router.rooms.is_tracked("7").await);
    }
}
