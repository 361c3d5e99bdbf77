//! Platform client trait
//!
//! The single seam between the control plane and the real-time platform's
//! server API. Implementations wrap the platform SDK; tests use a mock.

use async_trait::async_trait;

use crate::error::Result;

use super::types::{ParticipantInfo, RecordingOutput, RoomInfo};

/// Server-side operations the gateway issues against the platform
///
/// All calls may take arbitrarily long; callers must not hold registry-wide
/// locks across them. Failures are surfaced as [`crate::Error::Platform`]
/// and treated as best-effort by the callers.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// List all rooms currently known to the platform
    async fn list_rooms(&self) -> Result<Vec<RoomInfo>>;

    /// Create a room with the given name, metadata and participant cap
    async fn create_room(
        &self,
        name: &str,
        metadata: &str,
        max_participants: u32,
    ) -> Result<RoomInfo>;

    /// List participants currently in a room
    async fn list_participants(&self, room_name: &str) -> Result<Vec<ParticipantInfo>>;

    /// Remove a participant from a room
    async fn remove_participant(&self, room_name: &str, identity: &str) -> Result<()>;

    /// Delete a room
    async fn delete_room(&self, room_name: &str) -> Result<()>;

    /// Start a composite recording of a room; returns the recording id
    async fn start_recording(&self, room_name: &str, output: &RecordingOutput) -> Result<String>;

    /// Stop a recording by id
    async fn stop_recording(&self, recording_id: &str) -> Result<()>;
}
