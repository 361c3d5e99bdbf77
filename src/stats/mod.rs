//! Telemetry snapshots

pub mod metrics;

pub use metrics::{EgressStats, GatewayStats, IngressStats, TrackStats};
