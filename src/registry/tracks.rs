//! Track registry and ingress gate
//!
//! Maps published audio tracks to their owning call and role, and decides
//! per frame whether audio is relayed. Admission takes only a read lock on
//! the map and per-track telemetry is atomic, so concurrent streams never
//! block each other. Forwarding goes over a broadcast channel: send never
//! blocks the media path on a slow downstream consumer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{broadcast, RwLock};

use crate::audio::frame::AudioFrame;
use crate::roles::Role;
use crate::stats::{IngressStats, TrackStats};

/// Context attached to a registered track, fixed at attach time
#[derive(Debug)]
pub struct TrackContext {
    /// Owning callId
    pub call_id: String,

    /// Identity of the publishing participant
    pub participant_id: String,

    /// Role resolved when the participant joined; never re-resolved
    pub role: Role,

    /// When the track was attached
    pub attached_at: Instant,

    /// Frames admitted on this track
    frames_admitted: AtomicU64,

    /// Timestamp of the most recently admitted frame
    last_timestamp_ms: AtomicU64,
}

impl TrackContext {
    fn new(call_id: &str, participant_id: &str, role: Role) -> Self {
        Self {
            call_id: call_id.to_string(),
            participant_id: participant_id.to_string(),
            role,
            attached_at: Instant::now(),
            frames_admitted: AtomicU64::new(0),
            last_timestamp_ms: AtomicU64::new(0),
        }
    }

    /// Record frame timing telemetry
    fn record_frame(&self, frame: &AudioFrame) {
        self.frames_admitted.fetch_add(1, Ordering::Relaxed);
        self.last_timestamp_ms
            .store(frame.timestamp_ms, Ordering::Relaxed);
    }

    /// Snapshot the track's telemetry
    pub fn stats(&self) -> TrackStats {
        TrackStats {
            call_id: self.call_id.clone(),
            participant_id: self.participant_id.clone(),
            role: self.role,
            frames_admitted: self.frames_admitted.load(Ordering::Relaxed),
            last_timestamp_ms: self.last_timestamp_ms.load(Ordering::Relaxed),
            attached_for: self.attached_at.elapsed(),
        }
    }
}

/// Why a frame was not forwarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// trackSid is not registered (never attached, or already detached)
    UnknownTrack,
    /// Sample rate outside the supported set
    UnsupportedRate,
    /// Bot audio is never relayed into the call-facing path
    BotAudio,
}

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Forwarded,
    Dropped(DropReason),
}

/// An admitted frame on its way downstream
///
/// Cheap to clone: the context is shared and the frame payload is
/// reference-counted.
#[derive(Debug, Clone)]
pub struct ForwardedFrame {
    pub track: Arc<TrackContext>,
    pub frame: AudioFrame,
}

/// Registry of active audio tracks
pub struct TrackRegistry {
    /// Map of trackSid to track context
    tracks: RwLock<HashMap<String, Arc<TrackContext>>>,

    /// Fan-out for admitted frames
    forward_tx: broadcast::Sender<ForwardedFrame>,

    frames_admitted: AtomicU64,
    frames_dropped: AtomicU64,
}

impl TrackRegistry {
    /// Create a registry with the given forwarding channel capacity
    pub fn new(forward_capacity: usize) -> Self {
        let (forward_tx, _) = broadcast::channel(forward_capacity.max(1));
        Self {
            tracks: RwLock::new(HashMap::new()),
            forward_tx,
            frames_admitted: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
        }
    }

    /// Attach a track
    ///
    /// Idempotent: returns false and leaves the original context untouched
    /// if the trackSid is already registered.
    pub async fn attach(
        &self,
        track_sid: &str,
        call_id: &str,
        participant_id: &str,
        role: Role,
    ) -> bool {
        let mut tracks = self.tracks.write().await;
        if tracks.contains_key(track_sid) {
            tracing::debug!(track = %track_sid, "Track already attached");
            return false;
        }

        tracks.insert(
            track_sid.to_string(),
            Arc::new(TrackContext::new(call_id, participant_id, role)),
        );
        tracing::info!(
            track = %track_sid,
            call_id = %call_id,
            participant = %participant_id,
            role = %role,
            "Track attached"
        );
        true
    }

    /// Detach a track; idempotent
    pub async fn detach(&self, track_sid: &str) -> bool {
        let removed = self.tracks.write().await.remove(track_sid);
        if removed.is_some() {
            tracing::info!(track = %track_sid, "Track detached");
        }
        removed.is_some()
    }

    /// Detach every track belonging to a call; returns how many were removed
    pub async fn detach_call(&self, call_id: &str) -> usize {
        let mut tracks = self.tracks.write().await;
        let before = tracks.len();
        tracks.retain(|_, ctx| ctx.call_id != call_id);
        let removed = before - tracks.len();

        if removed > 0 {
            tracing::info!(call_id = %call_id, tracks = removed, "Tracks detached with call");
        }
        removed
    }

    /// Decide whether a frame is relayed
    ///
    /// Drops frames for unknown tracks, unsupported sample rates, and bot
    /// publishers. Admitted frames are forwarded without blocking on
    /// downstream consumers.
    pub async fn admit(&self, track_sid: &str, frame: AudioFrame) -> Admission {
        let ctx = { self.tracks.read().await.get(track_sid).cloned() };
        let Some(ctx) = ctx else {
            self.frames_dropped.fetch_add(1, Ordering::Relaxed);
            return Admission::Dropped(DropReason::UnknownTrack);
        };

        if !frame.is_supported_rate() {
            self.frames_dropped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                track = %track_sid,
                sample_rate = frame.sample_rate,
                "Dropping frame with unsupported sample rate"
            );
            return Admission::Dropped(DropReason::UnsupportedRate);
        }

        if ctx.role == Role::Bot {
            // Synthesized speech must not loop back as if spoken by the caller
            self.frames_dropped.fetch_add(1, Ordering::Relaxed);
            return Admission::Dropped(DropReason::BotAudio);
        }

        ctx.record_frame(&frame);
        self.frames_admitted.fetch_add(1, Ordering::Relaxed);

        let _ = self.forward_tx.send(ForwardedFrame { track: ctx, frame });
        Admission::Forwarded
    }

    /// Subscribe to admitted frames
    pub fn subscribe_forwarded(&self) -> broadcast::Receiver<ForwardedFrame> {
        self.forward_tx.subscribe()
    }

    /// Whether a trackSid is registered
    pub async fn contains(&self, track_sid: &str) -> bool {
        self.tracks.read().await.contains_key(track_sid)
    }

    /// Snapshot a single track's telemetry
    pub async fn track_stats(&self, track_sid: &str) -> Option<TrackStats> {
        let ctx = self.tracks.read().await.get(track_sid).cloned()?;
        Some(ctx.stats())
    }

    /// Number of registered tracks
    pub async fn track_count(&self) -> usize {
        self.tracks.read().await.len()
    }

    /// Snapshot ingress-wide counters
    pub async fn stats(&self) -> IngressStats {
        IngressStats {
            active_tracks: self.track_count().await,
            frames_admitted: self.frames_admitted.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
        }
    }
}
