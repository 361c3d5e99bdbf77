//! Call and track registries
//!
//! The two pieces of shared mutable state in the gateway, each owned by the
//! orchestrator and guarded per key:
//!
//! ```text
//!                      Arc<RoomRegistry>
//!                 ┌──────────────────────────┐
//!                 │ calls: HashMap<callId,   │
//!                 │   Arc<Mutex<CallEntry>>  │      per-call lock:
//!                 │ >                        │      create/close serialized
//!                 └────────────┬─────────────┘
//!                              │ phase transitions
//!                              ▼
//!                      Arc<TrackRegistry>
//!                 ┌──────────────────────────┐
//!                 │ tracks: HashMap<sid,     │      read-lock admission,
//!                 │   Arc<TrackContext>      │      broadcast fan-out of
//!                 │ >                        │      admitted frames
//!                 └──────────────────────────┘
//! ```
//!
//! Admitted frames share one allocation across all forwarding subscribers:
//! the broadcast channel clones the `ForwardedFrame`, but the inner sample
//! payload is only reference-counted, not copied.

pub mod entry;
pub mod rooms;
pub mod tracks;

pub use entry::{CallEntry, CallPhase};
pub use rooms::{ClosedCall, JoinOutcome, LeaveOutcome, RoomRegistry};
pub use tracks::{Admission, DropReason, ForwardedFrame, TrackContext, TrackRegistry};
