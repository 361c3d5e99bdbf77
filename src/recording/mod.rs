//! Recording controller
//!
//! Starts and stops composite room recordings on the external platform,
//! keyed by callId. Recordings are best-effort: a failed start leaves the
//! call running unrecorded, a failed stop is logged and forgotten. Tracking
//! state is always cleaned up locally regardless of external outcome.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::config::GatewayConfig;
use crate::platform::{PlatformClient, RecordingOutput};

/// Tracks at most one active recording per call
pub struct RecordingController<P: PlatformClient> {
    config: GatewayConfig,
    platform: Arc<P>,

    /// Map of callId to recording-id slot; the slot lock serializes
    /// start/stop for one call without blocking other calls
    active: RwLock<HashMap<String, Arc<Mutex<Option<String>>>>>,
}

impl<P: PlatformClient> RecordingController<P> {
    /// Create a new controller
    pub fn new(config: GatewayConfig, platform: Arc<P>) -> Self {
        Self {
            config,
            platform,
            active: RwLock::new(HashMap::new()),
        }
    }

    /// Start a composite recording for a call
    ///
    /// No-op if a recording is already tracked for the callId. Failure is
    /// logged and the call proceeds without recording.
    pub async fn start(&self, call_id: &str) {
        let slot = {
            let mut active = self.active.write().await;
            active
                .entry(call_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(None)))
                .clone()
        };

        let mut slot = slot.lock().await;
        if slot.is_some() {
            return;
        }

        let room_name = self.config.room_name(call_id);
        let output = RecordingOutput::mp4(&self.config.recording_dir, &room_name);

        match self.platform.start_recording(&room_name, &output).await {
            Ok(recording_id) => {
                tracing::info!(
                    call_id = %call_id,
                    room = %room_name,
                    recording_id = %recording_id,
                    "Recording started"
                );
                *slot = Some(recording_id);
            }
            Err(e) => {
                tracing::warn!(
                    call_id = %call_id,
                    room = %room_name,
                    error = %e,
                    "Failed to start recording"
                );
            }
        }
    }

    /// Stop the recording tracked for a call
    ///
    /// No-op if none is tracked. The tracking entry is removed whether or
    /// not the external stop succeeds.
    pub async fn stop(&self, call_id: &str) {
        let slot = self.active.write().await.remove(call_id);
        let Some(slot) = slot else {
            return;
        };

        let slot = slot.lock().await;
        let Some(recording_id) = slot.as_deref() else {
            return;
        };

        match self.platform.stop_recording(recording_id).await {
            Ok(()) => {
                tracing::info!(call_id = %call_id, recording_id = %recording_id, "Recording stopped");
            }
            Err(e) => {
                tracing::warn!(
                    call_id = %call_id,
                    recording_id = %recording_id,
                    error = %e,
                    "Failed to stop recording"
                );
            }
        }
    }

    /// Whether a recording is currently tracked for a call
    pub async fn is_recording(&self, call_id: &str) -> bool {
        let slot = { self.active.read().await.get(call_id).cloned() };
        match slot {
            Some(slot) => slot.lock().await.is_some(),
            None => false,
        }
    }
}
