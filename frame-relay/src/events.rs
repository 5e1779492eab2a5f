// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Observable relay events and diagnostic snapshots.

use std::sync::Arc;

use serde::Serialize;

/// Something the relay did that callers may want to observe.
///
/// Delivered on the relay's owning thread, in the order the transitions
/// happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RelayEvent {
    /// A frame was handed to the consumer.
    FrameQueued {
        presentation_time_us: i64,
        width: u32,
        height: u32,
    },

    /// A physical frame was claimed and discarded without being dispatched.
    FrameDropped { timestamp_us: i64, reason: DropReason },

    /// End of stream was forwarded to the consumer.
    EndOfStream,

    /// The watchdog expired and the stream was ended without its remaining
    /// frames.
    ForcedEndOfStream {
        missing_frames: usize,
        available_frames: usize,
        timeout_ms: u64,
    },

    /// A flush finished; the relay is ready to resume.
    FlushComplete,
}

/// Why a physical frame was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Registered before a flush, arrived after it.
    Flushed,
    /// Arrived after a forced end of stream and before the next registration.
    Rejected,
    /// Already available when the watchdog forced the stream to end.
    Terminated,
}

/// Callback receiving [`RelayEvent`]s.
pub type RelayEventCallback = Arc<dyn Fn(RelayEvent) + Send + Sync>;

/// Coarse stream state derived from the relay's internal bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayPhase {
    /// Nothing registered, available or in flight.
    Idle,
    /// Frames are registered, arriving or being processed.
    Streaming,
    /// End of input was signaled; waiting for the remaining frames.
    Draining,
    /// The stream was forced to end; arrivals are discarded until the next
    /// registration.
    Rejecting,
}

/// Point-in-time view of a relay, taken on its owning thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelaySnapshot {
    /// Coarse stream state.
    pub phase: RelayPhase,

    /// Registered descriptors not yet dispatched.
    pub pending_frames: usize,

    /// Physical frames announced by the producer and not yet claimed.
    pub available_frames: usize,

    /// Frames the consumer has said it can accept.
    pub consumer_capacity: usize,

    /// Whether the consumer holds a frame it has not reported processed.
    pub frame_in_flight: bool,

    /// Stale arrivals still to be discarded after a flush.
    pub frames_to_drop_on_arrival: usize,

    /// Whether the termination watchdog is counting down.
    pub watchdog_armed: bool,
}
