//! Voice call lifecycle orchestration and audio relay gating
//!
//! `voicegate` turns a stream of asynchronous room/participant/track
//! lifecycle events from a real-time media platform into a consistent
//! model of active calls, and gates the audio associated with those calls
//! by participant role.
//!
//! # Architecture
//!
//! ```text
//!   verified webhook body
//!           │
//!           ▼
//!     EventRouter ──────► RoomRegistry ──► PlatformClient (rooms, teardown)
//!           │                  │
//!           │                  ├──► RecordingController ──► PlatformClient
//!           │                  ▼
//!           │            CallEventBus ──► subscribers (handoff, billing)
//!           ▼
//!     TrackRegistry ◄── audio frames (external media pipeline)
//!           │
//!           ▼ admitted frames (broadcast, zero-copy)
//!      downstream consumers          AudioPublisher ──► AudioSink (outbound)
//! ```
//!
//! Events and frames arrive concurrently from independent deliveries; all
//! state is per-key guarded, so redelivered or out-of-order events settle
//! idempotently and unrelated calls never contend.
//!
//! # Example
//!
//! ```no_run
//! use voicegate::{Gateway, GatewayConfig};
//! # use voicegate::platform::{PlatformClient, ParticipantInfo, RecordingOutput, RoomInfo};
//! # struct Sdk;
//! # #[async_trait::async_trait]
//! # impl PlatformClient for Sdk {
//! #     async fn list_rooms(&self) -> voicegate::Result<Vec<RoomInfo>> { Ok(vec![]) }
//! #     async fn create_room(&self, _: &str, _: &str, _: u32) -> voicegate::Result<RoomInfo> { unimplemented!() }
//! #     async fn list_participants(&self, _: &str) -> voicegate::Result<Vec<ParticipantInfo>> { Ok(vec![]) }
//! #     async fn remove_participant(&self, _: &str, _: &str) -> voicegate::Result<()> { Ok(()) }
//! #     async fn delete_room(&self, _: &str) -> voicegate::Result<()> { Ok(()) }
//! #     async fn start_recording(&self, _: &str, _: &RecordingOutput) -> voicegate::Result<String> { Ok("rec".into()) }
//! #     async fn stop_recording(&self, _: &str) -> voicegate::Result<()> { Ok(()) }
//! # }
//!
//! # async fn example(webhook_body: &[u8]) {
//! let config = GatewayConfig::from_env().expect("platform credentials");
//! let gateway = Gateway::new(config, Sdk);
//!
//! let mut calls = gateway.subscribe();
//! gateway.dispatch_raw(webhook_body).await;
//! let _started = calls.recv().await;
//! # }
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod platform;
pub mod recording;
pub mod registry;
pub mod roles;
pub mod router;
pub mod stats;

pub use audio::{AudioFrame, AudioPublisher, AudioSink, PublishDrop, PublishOutcome};
pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use events::{CallEvent, CallEventBus, EventKind, LifecycleEvent};
pub use gateway::Gateway;
pub use registry::{Admission, DropReason, ForwardedFrame, RoomRegistry, TrackRegistry};
pub use roles::{resolve_role, Role};
pub use router::{DispatchOutcome, EventRouter};
pub use stats::GatewayStats;
