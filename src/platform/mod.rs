//! External real-time platform interface
//!
//! The gateway never talks to the media platform directly; everything goes
//! through the [`PlatformClient`] trait so the control plane stays testable
//! and the SDK binding stays swappable. The platform's own operations are
//! assumed idempotent or safely retriable; the gateway does not retry them.

pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use client::PlatformClient;
pub use types::{ParticipantInfo, RecordingOutput, RoomInfo};
