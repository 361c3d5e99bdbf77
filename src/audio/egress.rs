//! Outbound audio publishing
//!
//! One publisher guards one outbound stream. Correctness beats delivery
//! here: a frame that would reorder or overlap the stream is dropped, not
//! queued, and dropped frames are never retried.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;

use crate::error::Result;
use crate::stats::EgressStats;

use super::frame::AudioFrame;

/// Destination for published audio (the platform-side track writer)
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Write one frame to the outbound stream
    async fn write_frame(&self, frame: &AudioFrame) -> Result<()>;
}

/// Why a frame was not published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishDrop {
    /// Not mono, unsupported rate, or empty
    InvalidFormat,
    /// Timestamp not strictly greater than the last published frame
    NonMonotonic,
    /// Another publish is in flight on this stream
    Busy,
    /// The sink write failed
    SinkError,
}

/// Outcome of a publish attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    Dropped(PublishDrop),
}

/// Clears the busy flag on every exit path, including panics
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Single-writer publisher for one outbound audio stream
pub struct AudioPublisher<S: AudioSink> {
    sink: S,

    /// Timestamp of the last accepted frame
    last_timestamp_ms: AtomicU64,

    /// Whether a publish is in flight
    busy: AtomicBool,

    frames_published: AtomicU64,
    frames_dropped: AtomicU64,
}

impl<S: AudioSink> AudioPublisher<S> {
    /// Create a publisher over the given sink
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            last_timestamp_ms: AtomicU64::new(0),
            busy: AtomicBool::new(false),
            frames_published: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
        }
    }

    /// Publish a frame
    ///
    /// Rejects invalid formats, non-increasing timestamps and overlapping
    /// publishes; at most one frame is in flight at a time and accepted
    /// timestamps are strictly increasing for the life of the stream.
    pub async fn publish(&self, frame: AudioFrame) -> PublishOutcome {
        if !frame.is_valid_format() {
            return self.dropped(PublishDrop::InvalidFormat);
        }

        if frame.timestamp_ms <= self.last_timestamp_ms.load(Ordering::Acquire) {
            return self.dropped(PublishDrop::NonMonotonic);
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return self.dropped(PublishDrop::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        // Re-check under the flag: another publish may have advanced the
        // stream between the early check and winning the flag
        if frame.timestamp_ms <= self.last_timestamp_ms.load(Ordering::Acquire) {
            return self.dropped(PublishDrop::NonMonotonic);
        }
        self.last_timestamp_ms
            .store(frame.timestamp_ms, Ordering::Release);

        match self.sink.write_frame(&frame).await {
            Ok(()) => {
                self.frames_published.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(
                    timestamp_ms = frame.timestamp_ms,
                    samples = frame.sample_count(),
                    sample_rate = frame.sample_rate,
                    "Frame published"
                );
                PublishOutcome::Published
            }
            Err(e) => {
                tracing::warn!(
                    timestamp_ms = frame.timestamp_ms,
                    error = %e,
                    "Sink write failed; frame dropped"
                );
                self.dropped(PublishDrop::SinkError)
            }
        }
    }

    /// Timestamp of the last accepted frame (ms)
    pub fn last_timestamp_ms(&self) -> u64 {
        self.last_timestamp_ms.load(Ordering::Acquire)
    }

    /// Publisher counters
    pub fn stats(&self) -> EgressStats {
        EgressStats {
            frames_published: self.frames_published.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
        }
    }

    fn dropped(&self, reason: PublishDrop) -> PublishOutcome {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
        PublishOutcome::Dropped(reason)
    }
}
