//! Lifecycle events, inbound and outbound
//!
//! `inbound` decodes verified webhook payloads into tagged event variants;
//! `bus` fans call lifecycle notifications out to in-process subscribers.

pub mod bus;
pub mod inbound;

pub use bus::{CallEvent, CallEventBus};
pub use inbound::{decode_event, EventKind, LifecycleEvent, RoomMetadata, TrackType};
