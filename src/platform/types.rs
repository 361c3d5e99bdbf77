//! Platform data carriers
//!
//! Plain data mirrors of the platform's room and participant descriptors,
//! reduced to the fields the control plane reads.

/// A room known to the platform
#[derive(Debug, Clone)]
pub struct RoomInfo {
    /// Room name (e.g. `call_42`)
    pub name: String,

    /// Room metadata as raw JSON (embeds the callId)
    pub metadata: String,

    /// Participant cap requested at creation
    pub max_participants: u32,
}

/// A participant currently in a room
#[derive(Debug, Clone)]
pub struct ParticipantInfo {
    /// Participant identity
    pub identity: String,

    /// Participant metadata as raw JSON, if any
    pub metadata: Option<String>,
}

/// Output destination for a composite room recording
#[derive(Debug, Clone)]
pub struct RecordingOutput {
    /// Target file path (e.g. `recordings/call_42.mp4`)
    pub filepath: String,

    /// Composite layout preset
    pub layout: String,
}

impl RecordingOutput {
    /// MP4 output for a room under the given directory, speaker-focused layout
    pub fn mp4(dir: &str, room_name: &str) -> Self {
        Self {
            filepath: format!("{}/{}.mp4", dir, room_name),
            layout: "speaker-light".to_string(),
        }
    }
}
