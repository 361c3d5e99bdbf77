//! Statistics and metrics for calls and audio streams

use std::time::Duration;

use crate::roles::Role;

/// Telemetry snapshot for a single registered track
#[derive(Debug, Clone)]
pub struct TrackStats {
    /// Owning callId
    pub call_id: String,
    /// Publishing participant
    pub participant_id: String,
    /// Role fixed at attach time
    pub role: Role,
    /// Frames admitted on this track
    pub frames_admitted: u64,
    /// Timestamp of the most recently admitted frame (ms)
    pub last_timestamp_ms: u64,
    /// Time since the track was attached
    pub attached_for: Duration,
}

impl TrackStats {
    /// Average admitted frame rate since attach (frames/sec)
    pub fn frame_rate(&self) -> f64 {
        let secs = self.attached_for.as_secs_f64();
        if secs > 0.0 {
            self.frames_admitted as f64 / secs
        } else {
            0.0
        }
    }
}

/// Ingress-wide counters
#[derive(Debug, Clone, Default)]
pub struct IngressStats {
    /// Currently registered tracks
    pub active_tracks: usize,
    /// Frames admitted and forwarded
    pub frames_admitted: u64,
    /// Frames dropped at the gate (unknown track, bad rate, bot audio)
    pub frames_dropped: u64,
}

/// Egress publisher counters
#[derive(Debug, Clone, Default)]
pub struct EgressStats {
    /// Frames written to the sink
    pub frames_published: u64,
    /// Frames rejected (format, ordering, overlap, sink failure)
    pub frames_dropped: u64,
}

/// Gateway-wide snapshot
#[derive(Debug, Clone, Default)]
pub struct GatewayStats {
    /// Calls currently tracked
    pub active_calls: usize,
    /// Ingress counters
    pub ingress: IngressStats,
    /// Lifecycle events dispatched with effect
    pub events_handled: u64,
    /// Lifecycle events acknowledged without effect
    pub events_ignored: u64,
}
