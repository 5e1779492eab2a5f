// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Recording collaborators shared by unit tests.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use crate::{
    ArrivalNotifier, BoxError, FrameConsumer, FrameProducer, InputTexture, RelayEvent,
    RelayEventCallback, TransformMatrix,
};

#[derive(Debug, Default)]
struct ProducerState {
    backlog: VecDeque<i64>,
    claimed: usize,
    default_buffer_size: Option<(u32, u32)>,
    releases: usize,
}

/// Producer whose frames are rendered by hand with [`RecordingProducer::render`].
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingProducer {
    state: Arc<Mutex<ProducerState>>,
}

impl RecordingProducer {
    /// Makes one physical frame available. Does not notify anyone.
    pub(crate) fn render(&self, timestamp_ns: i64) {
        self.state.lock().backlog.push_back(timestamp_ns);
    }

    pub(crate) fn claimed(&self) -> usize {
        self.state.lock().claimed
    }

    pub(crate) fn backlog(&self) -> usize {
        self.state.lock().backlog.len()
    }

    pub(crate) fn default_buffer_size(&self) -> Option<(u32, u32)> {
        self.state.lock().default_buffer_size
    }

    pub(crate) fn release_count(&self) -> usize {
        self.state.lock().releases
    }
}

impl FrameProducer for RecordingProducer {
    fn create_surface(&mut self, _notifier: ArrivalNotifier) -> Result<u32, BoxError> {
        Ok(1)
    }

    fn set_default_buffer_size(&mut self, width: u32, height: u32) {
        self.state.lock().default_buffer_size = Some((width, height));
    }

    fn claim_frame(&mut self) -> i64 {
        let mut state = self.state.lock();
        state.claimed += 1;
        state.backlog.pop_front().unwrap_or_default()
    }

    fn transform_matrix(&self) -> TransformMatrix {
        TransformMatrix::IDENTITY
    }

    fn release(&mut self) {
        self.state.lock().releases += 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ConsumerCall {
    TransformMatrix(TransformMatrix),
    Queued(InputTexture, i64),
    EndOfStream,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingConsumer {
    calls: Arc<Mutex<Vec<ConsumerCall>>>,
}

impl RecordingConsumer {
    pub(crate) fn calls(&self) -> Vec<ConsumerCall> {
        self.calls.lock().clone()
    }

    pub(crate) fn queued_times(&self) -> Vec<i64> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                ConsumerCall::Queued(_, pts) => Some(*pts),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn last_queued(&self) -> Option<(InputTexture, i64)> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            ConsumerCall::Queued(texture, pts) => Some((*texture, *pts)),
            _ => None,
        })
    }

    pub(crate) fn end_of_stream_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, ConsumerCall::EndOfStream))
            .count()
    }
}

impl FrameConsumer for RecordingConsumer {
    fn set_texture_transform_matrix(&mut self, matrix: &TransformMatrix) {
        self.calls.lock().push(ConsumerCall::TransformMatrix(*matrix));
    }

    fn queue_input_frame(&mut self, texture: InputTexture, presentation_time_us: i64) {
        self.calls
            .lock()
            .push(ConsumerCall::Queued(texture, presentation_time_us));
    }

    fn signal_end_of_current_input_stream(&mut self) {
        self.calls.lock().push(ConsumerCall::EndOfStream);
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct EventLog {
    events: Arc<Mutex<Vec<RelayEvent>>>,
}

impl EventLog {
    pub(crate) fn callback(&self) -> RelayEventCallback {
        let events = Arc::clone(&self.events);
        Arc::new(move |event| events.lock().push(event))
    }

    /// Returns and clears everything recorded so far.
    pub(crate) fn take(&self) -> Vec<RelayEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}
