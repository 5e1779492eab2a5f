// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Consumer-side collaborator interface.

use crossbeam_channel::Sender;

use crate::{Error, InputTexture, Result, TransformMatrix, relay::command::Command};

/// Downstream stage receiving frames from a [`crate::FrameRelay`].
///
/// All methods are called on the relay's owning thread. Capacity and completion
/// are reported back through the [`ConsumerLink`] obtained from
/// [`crate::FrameRelay::consumer_link`].
pub trait FrameConsumer: Send + 'static {
    /// Sets the texture transform to apply to the next queued frame.
    fn set_texture_transform_matrix(&mut self, _matrix: &TransformMatrix) {}

    /// Receives one frame. The consumer owns `texture` until it calls
    /// [`ConsumerLink::on_input_frame_processed`].
    fn queue_input_frame(&mut self, texture: InputTexture, presentation_time_us: i64);

    /// Marks the end of the current input stream.
    fn signal_end_of_current_input_stream(&mut self);
}

/// Handle the consumer uses to grant capacity and report completed frames.
///
/// Cheap to clone and usable from any thread. Each call posts a task onto the
/// relay's owning thread and returns immediately.
#[derive(Debug, Clone)]
pub struct ConsumerLink {
    tx: Sender<Command>,
}

impl ConsumerLink {
    pub(crate) fn new(tx: Sender<Command>) -> Self {
        Self { tx }
    }

    /// Grants capacity for one more input frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Released`] once the relay has shut down.
    pub fn on_ready_to_accept_input_frame(&self) -> Result<()> {
        self.tx
            .send(Command::ReadyToAcceptInputFrame)
            .map_err(|_| Error::Released)
    }

    /// Reports that the frame in `texture` has been fully processed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Released`] once the relay has shut down.
    pub fn on_input_frame_processed(&self, texture: InputTexture) -> Result<()> {
        self.tx
            .send(Command::InputFrameProcessed(texture))
            .map_err(|_| Error::Released)
    }
}
