//! Audio frame types and outbound publishing
//!
//! Inbound admission lives in the track registry; this module owns the
//! frame type itself and the egress half of the media path.

pub mod egress;
pub mod frame;

pub use egress::{AudioPublisher, AudioSink, PublishDrop, PublishOutcome};
pub use frame::{AudioFrame, SUPPORTED_SAMPLE_RATES};
