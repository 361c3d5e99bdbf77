//! In-memory platform double for tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::client::PlatformClient;
use super::types::{ParticipantInfo, RecordingOutput, RoomInfo};

/// Scriptable in-memory platform
///
/// Tracks every call so tests can assert on exact external effects, and
/// exposes failure toggles to exercise the best-effort paths.
#[derive(Default)]
pub(crate) struct MockPlatform {
    pub rooms: Mutex<Vec<RoomInfo>>,
    pub participants: Mutex<HashMap<String, Vec<ParticipantInfo>>>,

    pub create_calls: AtomicUsize,
    pub deleted_rooms: Mutex<Vec<String>>,
    pub removed_participants: Mutex<Vec<(String, String)>>,
    pub started_recordings: Mutex<Vec<(String, String)>>,
    pub stopped_recordings: Mutex<Vec<String>>,
    next_recording_id: AtomicUsize,

    pub fail_create: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_list_participants: AtomicBool,
    pub fail_remove: AtomicBool,
    pub fail_start_recording: AtomicBool,
    pub fail_stop_recording: AtomicBool,

    /// Artificial latency applied to room listing/creation, to widen
    /// concurrency windows in tests
    pub call_latency: Mutex<Duration>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_participants(self, room_name: &str, identities: &[&str]) -> Self {
        {
            let mut participants = self.participants.lock().unwrap();
            participants.insert(
                room_name.to_string(),
                identities
                    .iter()
                    .map(|identity| ParticipantInfo {
                        identity: identity.to_string(),
                        metadata: None,
                    })
                    .collect(),
            );
        }
        self
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.call_latency.lock().unwrap() = latency;
    }

    async fn simulate_latency(&self) {
        let latency = *self.call_latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl PlatformClient for MockPlatform {
    async fn list_rooms(&self) -> Result<Vec<RoomInfo>> {
        self.simulate_latency().await;
        Ok(self.rooms.lock().unwrap().clone())
    }

    async fn create_room(
        &self,
        name: &str,
        metadata: &str,
        max_participants: u32,
    ) -> Result<RoomInfo> {
        self.simulate_latency().await;
        if self.fail_create.load(Ordering::Relaxed) {
            return Err(Error::Platform("create_room failed".into()));
        }

        self.create_calls.fetch_add(1, Ordering::Relaxed);
        let room = RoomInfo {
            name: name.to_string(),
            metadata: metadata.to_string(),
            max_participants,
        };
        self.rooms.lock().unwrap().push(room.clone());
        Ok(room)
    }

    async fn list_participants(&self, room_name: &str) -> Result<Vec<ParticipantInfo>> {
        if self.fail_list_participants.load(Ordering::Relaxed) {
            return Err(Error::Platform("list_participants failed".into()));
        }

        Ok(self
            .participants
            .lock()
            .unwrap()
            .get(room_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_participant(&self, room_name: &str, identity: &str) -> Result<()> {
        if self.fail_remove.load(Ordering::Relaxed) {
            return Err(Error::Platform("remove_participant failed".into()));
        }

        self.removed_participants
            .lock()
            .unwrap()
            .push((room_name.to_string(), identity.to_string()));
        Ok(())
    }

    async fn delete_room(&self, room_name: &str) -> Result<()> {
        if self.fail_delete.load(Ordering::Relaxed) {
            return Err(Error::Platform("delete_room failed".into()));
        }

        self.deleted_rooms.lock().unwrap().push(room_name.to_string());
        self.rooms.lock().unwrap().retain(|r| r.name != room_name);
        Ok(())
    }

    async fn start_recording(&self, room_name: &str, output: &RecordingOutput) -> Result<String> {
        if self.fail_start_recording.load(Ordering::Relaxed) {
            return Err(Error::Platform("start_recording failed".into()));
        }

        let id = format!(
            "rec_{}",
            self.next_recording_id.fetch_add(1, Ordering::Relaxed)
        );
        self.started_recordings
            .lock()
            .unwrap()
            .push((room_name.to_string(), output.filepath.clone()));
        Ok(id)
    }

    async fn stop_recording(&self, recording_id: &str) -> Result<()> {
        if self.fail_stop_recording.load(Ordering::Relaxed) {
            return Err(Error::Platform("stop_recording failed".into()));
        }

        self.stopped_recordings
            .lock()
            .unwrap()
            .push(recording_id.to_string());
        Ok(())
    }
}
