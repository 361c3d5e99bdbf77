//! Inbound lifecycle event decoding
//!
//! Webhook payloads arrive pre-verified from the transport layer. Decoding
//! is total: unknown event types, missing callId and malformed shapes all
//! classify to [`EventKind::Ignored`] instead of erroring, so redelivered
//! junk can be acknowledged without side effects.

use serde::{Deserialize, Serialize};

/// Room metadata payload embedding the owning callId
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomMetadata {
    #[serde(rename = "callId")]
    pub call_id: Option<String>,
}

impl RoomMetadata {
    /// Metadata JSON for a new room owned by `call_id`
    pub fn encode(call_id: &str) -> String {
        serde_json::to_string(&RoomMetadata {
            call_id: Some(call_id.to_string()),
        })
        .unwrap_or_default()
    }

    /// Extract a callId from raw room metadata, if present and well-formed
    pub fn extract_call_id(raw: Option<&str>) -> Option<String> {
        let raw = raw?;
        serde_json::from_str::<RoomMetadata>(raw)
            .ok()
            .and_then(|m| m.call_id)
            .filter(|id| !id.is_empty())
    }
}

/// Track kind as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    Audio,
    Video,
}

/// Room fields of a lifecycle event
#[derive(Debug, Clone, Deserialize)]
pub struct RoomPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: Option<String>,
}

/// Participant fields of a lifecycle event
#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantPayload {
    pub identity: String,
    #[serde(default)]
    pub metadata: Option<String>,
}

/// Track fields of a lifecycle event
#[derive(Debug, Clone, Deserialize)]
pub struct TrackPayload {
    pub sid: String,
    #[serde(rename = "type")]
    pub kind: TrackType,
}

/// A decoded, signature-verified lifecycle event
#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleEvent {
    pub event: String,
    #[serde(default)]
    pub room: Option<RoomPayload>,
    #[serde(default)]
    pub participant: Option<ParticipantPayload>,
    #[serde(default)]
    pub track: Option<TrackPayload>,
}

/// Tagged dispatch variant for a lifecycle event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    RoomStarted {
        call_id: String,
    },
    RoomFinished {
        call_id: String,
    },
    ParticipantJoined {
        call_id: String,
        identity: String,
        metadata: Option<String>,
    },
    ParticipantLeft {
        call_id: String,
        identity: String,
        metadata: Option<String>,
    },
    TrackPublished {
        call_id: String,
        sid: String,
        kind: TrackType,
        identity: String,
        metadata: Option<String>,
    },
    TrackUnpublished {
        call_id: String,
        sid: String,
        kind: TrackType,
    },
    /// Anything that must be acknowledged but carries no work: unknown
    /// event types, events without a callId, malformed shapes
    Ignored,
}

impl LifecycleEvent {
    /// Classify the event for dispatch
    ///
    /// Every path that cannot produce a complete variant lands on
    /// `Ignored`; classification never fails.
    pub fn classify(&self) -> EventKind {
        let Some(call_id) =
            RoomMetadata::extract_call_id(self.room.as_ref().and_then(|r| r.metadata.as_deref()))
        else {
            return EventKind::Ignored;
        };

        match self.event.as_str() {
            "room_started" => EventKind::RoomStarted { call_id },
            "room_finished" => EventKind::RoomFinished { call_id },
            "participant_joined" => match &self.participant {
                Some(p) => EventKind::ParticipantJoined {
                    call_id,
                    identity: p.identity.clone(),
                    metadata: p.metadata.clone(),
                },
                None => EventKind::Ignored,
            },
            "participant_left" => match &self.participant {
                Some(p) => EventKind::ParticipantLeft {
                    call_id,
                    identity: p.identity.clone(),
                    metadata: p.metadata.clone(),
                },
                None => EventKind::Ignored,
            },
            "track_published" => match (&self.track, &self.participant) {
                (Some(t), Some(p)) => EventKind::TrackPublished {
                    call_id,
                    sid: t.sid.clone(),
                    kind: t.kind,
                    identity: p.identity.clone(),
                    metadata: p.metadata.clone(),
                },
                _ => EventKind::Ignored,
            },
            "track_unpublished" => match &self.track {
                Some(t) => EventKind::TrackUnpublished {
                    call_id,
                    sid: t.sid.clone(),
                    kind: t.kind,
                },
                None => EventKind::Ignored,
            },
            _ => EventKind::Ignored,
        }
    }
}

/// Decode a raw webhook body into a dispatch variant
///
/// Malformed JSON classifies as `Ignored`; the transport still answers 200.
pub fn decode_event(body: &[u8]) -> EventKind {
    match serde_json::from_slice::<LifecycleEvent>(body) {
        Ok(event) => event.classify(),
        Err(e) => {
            tracing::debug!(error = %e, "Discarding undecodable lifecycle event");
            EventKind::Ignored
        }
    }
}
