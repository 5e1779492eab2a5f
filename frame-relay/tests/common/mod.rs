// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Fake collaborators and helpers shared by the integration tests.
//!
//! [`FakeDecoder`] stands in for a hardware decoder: the test "decodes" a frame
//! by calling [`FakeDecoder::decode`], which appends it to the backlog and
//! notifies the relay, exactly like a real producer would from its own thread.
//! [`FakeEncoder`] records what the relay hands it; the test drives capacity and
//! completion through the relay's [`frame_relay::ConsumerLink`].

#![allow(dead_code)]

use std::{collections::VecDeque, sync::Arc, time::Duration};

use crossbeam_channel::Receiver;
use frame_relay::{
    ArrivalNotifier, BoxError, FrameConsumer, FrameProducer, FrameRelay, InputTexture, RelayEvent,
    TransformMatrix, config::RelayConfig,
};
use parking_lot::Mutex;

/// Guards the one-time subscriber installation shared by every test binary.
static LOG_ONCE: std::sync::Once = std::sync::Once::new();

/// How long a test waits for an event before failing.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default filter when `RUST_LOG` is unset: relay transitions, nothing else.
const DEFAULT_TEST_FILTER: &str = "frame_relay=debug";

/// Routes relay logs through the test harness output capture.
///
/// Thread names are shown so records from the owning thread and the watchdog
/// timer can be told apart.
pub fn setup_test() {
    LOG_ONCE.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_TEST_FILTER));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .with_test_writer()
            .try_init();
    });
}

#[derive(Default)]
struct DecoderState {
    notifier: Option<ArrivalNotifier>,
    backlog: VecDeque<i64>,
    claimed: Vec<i64>,
    buffer_size: Option<(u32, u32)>,
    releases: usize,
    fail_surface: bool,
}

#[derive(Clone, Default)]
pub struct FakeDecoder {
    state: Arc<Mutex<DecoderState>>,
}

impl FakeDecoder {
    pub const TEXTURE_ID: u32 = 42;

    /// A decoder whose surface allocation fails.
    pub fn failing() -> Self {
        let decoder = Self::default();
        decoder.state.lock().fail_surface = true;
        decoder
    }

    /// Renders one frame with the given timestamp and announces it.
    pub fn decode(&self, timestamp_ns: i64) -> frame_relay::Result<()> {
        let notifier = {
            let mut state = self.state.lock();
            state.backlog.push_back(timestamp_ns);
            state.notifier.clone()
        };
        notifier
            .expect("surface was never created")
            .notify_frame_available()
    }

    /// The notifier handed over at surface creation, until release.
    pub fn notifier(&self) -> Option<ArrivalNotifier> {
        self.state.lock().notifier.clone()
    }

    pub fn claimed(&self) -> Vec<i64> {
        self.state.lock().claimed.clone()
    }

    pub fn backlog(&self) -> usize {
        self.state.lock().backlog.len()
    }

    pub fn buffer_size(&self) -> Option<(u32, u32)> {
        self.state.lock().buffer_size
    }

    pub fn releases(&self) -> usize {
        self.state.lock().releases
    }
}

impl FrameProducer for FakeDecoder {
    fn create_surface(&mut self, notifier: ArrivalNotifier) -> Result<u32, BoxError> {
        let mut state = self.state.lock();
        if state.fail_surface {
            return Err("no EGL context".into());
        }
        state.notifier = Some(notifier);
        Ok(Self::TEXTURE_ID)
    }

    fn set_default_buffer_size(&mut self, width: u32, height: u32) {
        self.state.lock().buffer_size = Some((width, height));
    }

    fn claim_frame(&mut self) -> i64 {
        let mut state = self.state.lock();
        let timestamp_ns = state
            .backlog
            .pop_front()
            .expect("relay claimed a frame that was never announced");
        state.claimed.push(timestamp_ns);
        timestamp_ns
    }

    fn transform_matrix(&self) -> TransformMatrix {
        TransformMatrix::IDENTITY
    }

    fn release(&mut self) {
        let mut state = self.state.lock();
        state.releases += 1;
        state.notifier = None;
    }
}

#[derive(Default)]
struct EncoderState {
    queued: Vec<(InputTexture, i64)>,
    end_of_streams: usize,
}

#[derive(Clone, Default)]
pub struct FakeEncoder {
    state: Arc<Mutex<EncoderState>>,
}

impl FakeEncoder {
    pub fn queued(&self) -> Vec<(InputTexture, i64)> {
        self.state.lock().queued.clone()
    }

    pub fn queued_times(&self) -> Vec<i64> {
        self.state.lock().queued.iter().map(|(_, pts)| *pts).collect()
    }

    pub fn end_of_streams(&self) -> usize {
        self.state.lock().end_of_streams
    }
}

impl FrameConsumer for FakeEncoder {
    fn queue_input_frame(&mut self, texture: InputTexture, presentation_time_us: i64) {
        self.state
            .lock()
            .queued
            .push((texture, presentation_time_us));
    }

    fn signal_end_of_current_input_stream(&mut self) {
        self.state.lock().end_of_streams += 1;
    }
}

/// A relay wired to fakes, with its events forwarded to a channel.
pub struct Fixture {
    pub relay: FrameRelay,
    pub decoder: FakeDecoder,
    pub encoder: FakeEncoder,
    pub events: Receiver<RelayEvent>,
}

impl Fixture {
    pub fn new(config: RelayConfig) -> Self {
        setup_test();
        let decoder = FakeDecoder::default();
        let encoder = FakeEncoder::default();
        let (tx, events) = crossbeam_channel::unbounded();
        let relay = FrameRelay::with_event_callback(
            config,
            decoder.clone(),
            encoder.clone(),
            Arc::new(move |event| {
                let _ = tx.send(event);
            }),
        )
        .unwrap();
        Self {
            relay,
            decoder,
            encoder,
            events,
        }
    }

    /// Waits for the next event.
    pub fn next_event(&self) -> RelayEvent {
        self.events
            .recv_timeout(EVENT_TIMEOUT)
            .expect("timed out waiting for relay event")
    }

    /// Asserts that no event is emitted once every posted task has run.
    pub fn assert_no_event(&self) {
        self.relay.snapshot().unwrap();
        assert_eq!(self.events.try_recv().ok(), None);
    }

    /// Reports the most recently queued frame as processed.
    pub fn complete_current(&self) {
        let (texture, _) = *self.encoder.queued().last().expect("no frame queued");
        self.relay
            .consumer_link()
            .on_input_frame_processed(texture)
            .unwrap();
    }
}
