//! Gateway facade
//!
//! Wires configuration, the registries, the recording controller and the
//! event router into one owner. Transport is not handled here: the process
//! hosting the gateway feeds verified webhook bodies into
//! [`dispatch_raw`](Gateway::dispatch_raw) and wires publishers/consumers
//! as it sees fit.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::GatewayConfig;
use crate::events::bus::{CallEvent, CallEventBus};
use crate::events::inbound::{decode_event, LifecycleEvent};
use crate::platform::PlatformClient;
use crate::recording::RecordingController;
use crate::registry::rooms::RoomRegistry;
use crate::registry::tracks::{ForwardedFrame, TrackRegistry};
use crate::router::{DispatchOutcome, EventRouter};
use crate::stats::GatewayStats;

/// Call lifecycle orchestrator and audio relay gate
pub struct Gateway<P: PlatformClient> {
    config: GatewayConfig,
    rooms: Arc<RoomRegistry<P>>,
    tracks: Arc<TrackRegistry>,
    recording: Arc<RecordingController<P>>,
    bus: CallEventBus,
    router: EventRouter<P>,
}

impl<P: PlatformClient> Gateway<P> {
    /// Create a gateway over the given platform client
    pub fn new(config: GatewayConfig, platform: P) -> Self {
        let platform = Arc::new(platform);
        let recording = Arc::new(RecordingController::new(config.clone(), platform.clone()));
        let rooms = Arc::new(RoomRegistry::new(
            config.clone(),
            platform,
            recording.clone(),
        ));
        let tracks = Arc::new(TrackRegistry::new(config.forward_capacity));
        let bus = CallEventBus::new(config.event_bus_capacity);
        let router = EventRouter::new(rooms.clone(), tracks.clone(), recording.clone(), bus.clone());

        Self {
            config,
            rooms,
            tracks,
            recording,
            bus,
            router,
        }
    }

    /// Gateway configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Dispatch a decoded lifecycle event
    pub async fn dispatch(&self, event: &LifecycleEvent) -> DispatchOutcome {
        self.router.dispatch(event).await
    }

    /// Decode and dispatch a raw, already-verified webhook body
    pub async fn dispatch_raw(&self, body: &[u8]) -> DispatchOutcome {
        self.router.handle(decode_event(body)).await
    }

    /// Subscribe to call lifecycle notifications
    pub fn subscribe(&self) -> broadcast::Receiver<CallEvent> {
        self.bus.subscribe()
    }

    /// The call event bus (for emitting handoff notifications, etc.)
    pub fn events(&self) -> &CallEventBus {
        &self.bus
    }

    /// Subscribe to admitted audio frames
    pub fn subscribe_forwarded(&self) -> broadcast::Receiver<ForwardedFrame> {
        self.tracks.subscribe_forwarded()
    }

    /// The track registry (frame admission)
    pub fn tracks(&self) -> &Arc<TrackRegistry> {
        &self.tracks
    }

    /// The call/room registry
    pub fn rooms(&self) -> &Arc<RoomRegistry<P>> {
        &self.rooms
    }

    /// The recording controller
    pub fn recording(&self) -> &Arc<RecordingController<P>> {
        &self.recording
    }

    /// Gateway-wide telemetry snapshot
    pub async fn stats(&self) -> GatewayStats {
        GatewayStats {
            active_calls: self.rooms.call_count().await,
            ingress: self.tracks.stats().await,
            events_handled: self.router.events_handled(),
            events_ignored: self.router.events_ignored(),
        }
    }
}
