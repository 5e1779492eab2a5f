// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Producer-facing arrival notifications.

use crossbeam_channel::Sender;

use crate::{Error, Result, relay::command::Command};

/// Signals the relay that one more physical frame is available.
///
/// Handed to the producer by [`crate::FrameProducer::create_surface`]. The
/// notification carries no payload: the relay claims the frame itself, in
/// order, on its owning thread.
#[derive(Debug, Clone)]
pub struct ArrivalNotifier {
    tx: Sender<Command>,
}

impl ArrivalNotifier {
    pub(crate) fn new(tx: Sender<Command>) -> Self {
        Self { tx }
    }

    /// Announces one newly available frame. Callable from any thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Released`] once the relay has shut down. The frame is
    /// then never claimed and the producer should stop rendering.
    pub fn notify_frame_available(&self) -> Result<()> {
        self.tx
            .send(Command::FrameAvailable)
            .map_err(|_| Error::Released)
    }
}
