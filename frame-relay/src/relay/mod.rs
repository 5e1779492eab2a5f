// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! The public relay handle.
//!
//! A [`FrameRelay`] owns one dedicated thread that applies every state
//! transition in the order the corresponding calls were made. All public
//! operations post a task to that thread and return without waiting for it,
//! except [`FrameRelay::snapshot`] and [`FrameRelay::release`].

pub(crate) mod command;
mod state;
mod worker;

use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread::JoinHandle,
};

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::{
    ArrivalNotifier, ConsumerLink, Error, FrameConsumer, FrameInfo, FrameProducer, PendingQueue,
    RelayEventCallback, RelaySnapshot, Result, config::RelayConfig, watchdog::Watchdog,
};
use command::Command;

/// Relays frames from a [`FrameProducer`] to a [`FrameConsumer`].
///
/// Callers register one [`FrameInfo`] per frame they feed to the producer, in
/// the same order. The relay pairs each physical frame with its descriptor,
/// hands it to the consumer one at a time as capacity allows, and forwards end
/// of stream once everything registered has been processed. If the producer
/// stalls after end of input, a watchdog ends the stream after
/// [`RelayConfig::watchdog_timeout_ms`].
///
/// The handle is `Send + Sync`; every method may be called from any thread.
pub struct FrameRelay {
    tx: Sender<Command>,
    pending: PendingQueue,
    texture_id: u32,
    config: RelayConfig,
    released: AtomicBool,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl FrameRelay {
    /// Creates a relay, asking `producer` to allocate its surface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SurfaceCreation`] if the producer fails to create its
    /// surface, or [`Error::ThreadSpawn`] if a relay thread cannot be started.
    pub fn new(
        config: RelayConfig,
        producer: impl FrameProducer,
        consumer: impl FrameConsumer,
    ) -> Result<Self> {
        Self::build(config, producer, consumer, None)
    }

    /// Like [`FrameRelay::new`], additionally delivering every
    /// [`crate::RelayEvent`] to `callback` on the owning thread.
    ///
    /// # Errors
    ///
    /// Same as [`FrameRelay::new`].
    pub fn with_event_callback(
        config: RelayConfig,
        producer: impl FrameProducer,
        consumer: impl FrameConsumer,
        callback: RelayEventCallback,
    ) -> Result<Self> {
        Self::build(config, producer, consumer, Some(callback))
    }

    fn build(
        config: RelayConfig,
        mut producer: impl FrameProducer,
        consumer: impl FrameConsumer,
        events: Option<RelayEventCallback>,
    ) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();

        let texture_id = producer
            .create_surface(ArrivalNotifier::new(tx.clone()))
            .map_err(Error::SurfaceCreation)?;

        let watchdog = match Watchdog::spawn(
            config.watchdog_timeout(),
            config.watchdog_thread_name(),
            tx.clone(),
        ) {
            Ok(watchdog) => watchdog,
            Err(e) => {
                producer.release();
                return Err(e);
            }
        };

        let pending = PendingQueue::new();
        let core = state::RelayCore::new(
            Box::new(producer),
            Box::new(consumer),
            texture_id,
            pending.clone(),
            watchdog,
            events,
        );

        // On failure the closure, and the core with it, is dropped and released.
        let id = config.id;
        let join = std::thread::Builder::new()
            .name(config.relay_thread_name())
            .spawn(move || worker::relay_main(core, rx, id))?;

        debug!(
            id = %config.id,
            texture_id,
            watchdog_timeout_ms = config.watchdog_timeout_ms,
            "Created frame relay"
        );

        Ok(Self {
            tx,
            pending,
            texture_id,
            config,
            released: AtomicBool::new(false),
            join: Mutex::new(Some(join)),
        })
    }

    /// Registers the descriptor of the next frame fed to the producer.
    ///
    /// The descriptor is queued immediately, so [`FrameRelay::pending_frame_count`]
    /// reflects it as soon as this returns. Registration also lifts any
    /// rejection left behind by a forced end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Released`] once the relay has been released.
    pub fn register_input_frame(&self, info: FrameInfo) -> Result<()> {
        self.ensure_live()?;
        self.pending.push(info);
        self.post(Command::FrameRegistered)
    }

    /// Number of registered frames not yet handed to the consumer.
    ///
    /// Excludes the frame currently in flight.
    pub fn pending_frame_count(&self) -> usize {
        self.pending.len()
    }

    /// Signals that no more frames will be registered for the current stream.
    ///
    /// End of stream reaches the consumer once every registered frame has been
    /// processed, or when the watchdog gives up waiting for them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Released`] once the relay has been released.
    pub fn signal_end_of_current_input_stream(&self) -> Result<()> {
        self.post(Command::EndOfInput)
    }

    /// Discards every registered, available and in-flight frame.
    ///
    /// Frames registered before the flush that the producer has not rendered
    /// yet are discarded when they arrive. Completion is reported through
    /// [`crate::RelayEvent::FlushComplete`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Released`] once the relay has been released.
    pub fn flush(&self) -> Result<()> {
        self.post(Command::Flush)
    }

    /// Forwards the default buffer size to the producer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Released`] once the relay has been released.
    pub fn set_default_buffer_size(&self, width: u32, height: u32) -> Result<()> {
        self.post(Command::SetDefaultBufferSize { width, height })
    }

    /// Handle for the consumer to grant capacity and report processed frames.
    pub fn consumer_link(&self) -> ConsumerLink {
        ConsumerLink::new(self.tx.clone())
    }

    /// Name of the texture backing the producer's surface.
    pub fn texture_id(&self) -> u32 {
        self.texture_id
    }

    /// Configuration the relay was created with.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Returns `true` once [`FrameRelay::release`] has been called.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Returns the relay's state once every previously posted task has run.
    ///
    /// Blocks until the owning thread gets to the request. Must not be called
    /// from a [`RelayEventCallback`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Released`] once the relay has been released.
    pub fn snapshot(&self) -> Result<RelaySnapshot> {
        let (resp_tx, resp_rx) = crossbeam_channel::bounded(1);
        self.post(Command::Snapshot { resp_tx })?;
        resp_rx.recv().map_err(|_| Error::Released)
    }

    /// Stops the owning thread and releases the producer's resources.
    ///
    /// Tasks posted before this call still run. Releasing twice is a no-op.
    /// When called from the owning thread (for example from an event
    /// callback) the thread is stopped without being joined.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Other`] if the owning thread panicked.
    pub fn release(&self) -> Result<()> {
        if self.released.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        // The thread may already be gone if it panicked.
        let _ = self.tx.send(Command::Release);

        let Some(join) = self.join.lock().take() else {
            return Ok(());
        };
        if join.thread().id() == std::thread::current().id() {
            return Ok(());
        }
        join.join()
            .map_err(|_| Error::Other("Frame relay thread panicked.".to_string()))?;
        debug!(id = %self.config.id, "Released frame relay");
        Ok(())
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_released() {
            Err(Error::Released)
        } else {
            Ok(())
        }
    }

    fn post(&self, command: Command) -> Result<()> {
        self.ensure_live()?;
        self.tx.send(command).map_err(|_| Error::Released)
    }
}

impl Drop for FrameRelay {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            error!("Failed to release frame relay: {}", err);
        }
    }
}
