// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Relay state machine.
//!
//! [`RelayCore`] holds every piece of mutable relay state and is only ever
//! touched by the owning thread, so none of its fields need locking. The one
//! exception is the [`PendingQueue`], which callers append to directly.
//!
//! Dispatch happens whenever all three hold at once:
//!
//! - the consumer has capacity,
//! - at least one physical frame is available,
//! - no frame is in flight.

use tracing::{debug, trace, warn};

use crate::{
    DropReason, FrameConsumer, FrameInfo, FrameProducer, InputTexture, PendingQueue, RelayEvent,
    RelayEventCallback, RelayPhase, RelaySnapshot, watchdog::Watchdog,
};

/// Stream-level state. Replaces an "input ended" flag and a "reject incoming"
/// flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamPhase {
    /// Arrivals are relayed normally.
    Active,
    /// End of input was signaled while frames were outstanding. The watchdog
    /// is armed.
    ///
    /// `rejecting` is set when end of input is re-entered after a forced end
    /// while a descriptor was already pushed but its registration task has not
    /// run yet. Arrivals stay discarded until that task runs.
    Draining { rejecting: bool },
    /// The watchdog forced the stream to end. Arrivals are discarded until the
    /// next registration.
    Rejecting,
}

impl StreamPhase {
    fn is_draining(self) -> bool {
        matches!(self, StreamPhase::Draining { .. })
    }

    fn is_rejecting(self) -> bool {
        matches!(
            self,
            StreamPhase::Rejecting | StreamPhase::Draining { rejecting: true }
        )
    }
}

pub(crate) struct RelayCore {
    producer: Box<dyn FrameProducer>,
    consumer: Box<dyn FrameConsumer>,
    texture_id: u32,
    pending: PendingQueue,
    watchdog: Watchdog,
    events: Option<RelayEventCallback>,
    phase: StreamPhase,
    // Physical frames announced by the producer but not yet claimed.
    available_frame_count: usize,
    consumer_capacity: usize,
    current_frame: Option<FrameInfo>,
    // Frames registered before a flush that will still arrive after it.
    frames_to_drop_on_arrival: usize,
    released: bool,
}

impl RelayCore {
    pub(crate) fn new(
        producer: Box<dyn FrameProducer>,
        consumer: Box<dyn FrameConsumer>,
        texture_id: u32,
        pending: PendingQueue,
        watchdog: Watchdog,
        events: Option<RelayEventCallback>,
    ) -> Self {
        Self {
            producer,
            consumer,
            texture_id,
            pending,
            watchdog,
            events,
            phase: StreamPhase::Active,
            available_frame_count: 0,
            consumer_capacity: 0,
            current_frame: None,
            frames_to_drop_on_arrival: 0,
            released: false,
        }
    }

    /// A new registration means a new stream is expected, overriding any
    /// earlier forced rejection.
    pub(crate) fn on_frame_registered(&mut self) {
        match self.phase {
            StreamPhase::Rejecting => self.phase = StreamPhase::Active,
            StreamPhase::Draining { rejecting: true } => {
                self.phase = StreamPhase::Draining { rejecting: false }
            }
            _ => return,
        }
        debug!("Registration received, accepting incoming frames again");
    }

    pub(crate) fn on_frame_available(&mut self) {
        if self.frames_to_drop_on_arrival > 0 {
            self.frames_to_drop_on_arrival -= 1;
            self.drop_frame(DropReason::Flushed);
            self.maybe_complete_flush();
        } else if self.phase.is_rejecting() {
            let timestamp_us = self.drop_frame(DropReason::Rejected);
            warn!(
                "Dropping frame received after forcing end of stream: {}",
                timestamp_us
            );
        } else {
            if self.phase.is_draining() {
                // Still alive, just late.
                self.watchdog.restart();
            }
            self.available_frame_count += 1;
            trace!(available = self.available_frame_count, "Frame available");
            self.maybe_queue_frame();
        }
    }

    pub(crate) fn on_ready_to_accept_input_frame(&mut self) {
        self.consumer_capacity += 1;
        self.maybe_queue_frame();
    }

    pub(crate) fn on_input_frame_processed(&mut self, texture: InputTexture) {
        trace!(tex_id = texture.tex_id, "Input frame processed");
        self.current_frame = None;
        if self.phase.is_draining() && self.pending.is_empty() {
            self.forward_end_of_stream();
        } else {
            self.maybe_queue_frame();
        }
    }

    pub(crate) fn signal_end_of_input(&mut self) {
        if self.pending.is_empty() && self.current_frame.is_none() {
            self.forward_end_of_stream();
        } else {
            debug!(
                pending = self.pending.len(),
                in_flight = self.current_frame.is_some(),
                "End of input signaled with frames outstanding"
            );
            self.phase = StreamPhase::Draining {
                rejecting: self.phase.is_rejecting(),
            };
            self.watchdog.restart();
        }
    }

    pub(crate) fn flush(&mut self) {
        // Frames registered before the flush may still be made available after it.
        self.frames_to_drop_on_arrival = self
            .pending
            .len()
            .saturating_sub(self.available_frame_count);
        self.remove_all_available_frames(DropReason::Flushed);
        self.consumer_capacity = 0;
        self.current_frame = None;
        self.pending.clear();
        debug!(
            frames_to_drop = self.frames_to_drop_on_arrival,
            "Flushed relay"
        );
        self.maybe_complete_flush();
    }

    pub(crate) fn set_default_buffer_size(&mut self, width: u32, height: u32) {
        self.producer.set_default_buffer_size(width, height);
    }

    pub(crate) fn on_watchdog_expired(&mut self, generation: u64) {
        if self.watchdog.take_expired(generation) {
            self.force_end_of_stream();
        }
    }

    /// Tears down producer-side resources and the watchdog. Idempotent.
    pub(crate) fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.watchdog.shutdown();
        self.producer.release();
        debug!("Frame relay released");
    }

    pub(crate) fn snapshot(&self) -> RelaySnapshot {
        let pending_frames = self.pending.len();
        let phase = match self.phase {
            StreamPhase::Draining { .. } => RelayPhase::Draining,
            StreamPhase::Rejecting => RelayPhase::Rejecting,
            StreamPhase::Active
                if pending_frames == 0
                    && self.available_frame_count == 0
                    && self.current_frame.is_none() =>
            {
                RelayPhase::Idle
            }
            StreamPhase::Active => RelayPhase::Streaming,
        };
        RelaySnapshot {
            phase,
            pending_frames,
            available_frames: self.available_frame_count,
            consumer_capacity: self.consumer_capacity,
            frame_in_flight: self.current_frame.is_some(),
            frames_to_drop_on_arrival: self.frames_to_drop_on_arrival,
            watchdog_armed: self.watchdog.is_armed(),
        }
    }

    fn force_end_of_stream(&mut self) {
        let missing_frames = self.pending.len();
        let timeout_ms = self.watchdog.timeout().as_millis() as u64;
        warn!(
            "Forcing end of stream after missing {} frames for {} ms, with available frame count: {}",
            missing_frames, timeout_ms, self.available_frame_count
        );
        self.emit(RelayEvent::ForcedEndOfStream {
            missing_frames,
            available_frames: self.available_frame_count,
            timeout_ms,
        });

        self.phase = StreamPhase::Rejecting;
        self.current_frame = None;
        self.pending.clear();
        // Frames may have become available while the consumer was still busy
        // with the frame in flight.
        self.remove_all_available_frames(DropReason::Terminated);
        self.signal_end_of_input();
    }

    fn forward_end_of_stream(&mut self) {
        match self.phase {
            // Further input streams may follow this one.
            StreamPhase::Draining { rejecting: false } => self.phase = StreamPhase::Active,
            StreamPhase::Draining { rejecting: true } => self.phase = StreamPhase::Rejecting,
            StreamPhase::Active | StreamPhase::Rejecting => {}
        }
        self.consumer.signal_end_of_current_input_stream();
        self.watchdog.cancel();
        debug!("Forwarded end of stream");
        self.emit(RelayEvent::EndOfStream);
    }

    fn maybe_complete_flush(&mut self) {
        if self.frames_to_drop_on_arrival > 0 {
            return;
        }
        debug!("Flush complete");
        self.emit(RelayEvent::FlushComplete);
    }

    fn maybe_queue_frame(&mut self) {
        if self.consumer_capacity == 0
            || self.available_frame_count == 0
            || self.current_frame.is_some()
        {
            return;
        }
        let Some(frame) = self.pending.pop() else {
            warn!(
                available = self.available_frame_count,
                "Frame available without a registered descriptor, waiting for registration"
            );
            return;
        };

        let frame_time_ns = self.producer.claim_frame();
        self.available_frame_count -= 1;
        self.consumer_capacity -= 1;
        self.current_frame = Some(frame);

        let matrix = self.producer.transform_matrix();
        self.consumer.set_texture_transform_matrix(&matrix);
        // Downstream stages must not see the stream offset.
        let presentation_time_us = frame.presentation_time_us(frame_time_ns);
        let texture = InputTexture::external(self.texture_id, frame.width, frame.height);
        self.consumer.queue_input_frame(texture, presentation_time_us);
        trace!(presentation_time_us, "Queued frame to consumer");
        self.emit(RelayEvent::FrameQueued {
            presentation_time_us,
            width: frame.width,
            height: frame.height,
        });
    }

    fn remove_all_available_frames(&mut self, reason: DropReason) {
        while self.available_frame_count > 0 {
            self.available_frame_count -= 1;
            self.drop_frame(reason);
        }
    }

    /// Claims one physical frame without forwarding it. Returns its timestamp
    /// in microseconds.
    fn drop_frame(&mut self, reason: DropReason) -> i64 {
        let timestamp_us = self.producer.claim_frame() / 1000;
        trace!(timestamp_us, ?reason, "Dropped frame");
        self.emit(RelayEvent::FrameDropped {
            timestamp_us,
            reason,
        });
        timestamp_us
    }

    fn emit(&self, event: RelayEvent) {
        if let Some(events) = &self.events {
            events(event);
        }
    }
}

impl Drop for RelayCore {
    fn drop(&mut self) {
        self.release();
    }
}
