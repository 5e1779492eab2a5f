// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Tasks posted onto the relay's owning thread.

use crossbeam_channel::Sender;

use crate::{InputTexture, RelaySnapshot};

/// One unit of work for the owning thread. Executed strictly in post order.
#[derive(Debug)]
pub(crate) enum Command {
    /// A descriptor was appended to the pending queue.
    FrameRegistered,
    /// The producer has one more physical frame available.
    FrameAvailable,
    /// The consumer can accept one more frame.
    ReadyToAcceptInputFrame,
    /// The consumer finished with the frame in flight.
    InputFrameProcessed(InputTexture),
    /// The caller will register no more frames for the current stream.
    EndOfInput,
    /// Discard everything registered so far.
    Flush,
    /// Forwarded to the producer.
    SetDefaultBufferSize { width: u32, height: u32 },
    /// The watchdog armed with `generation` expired.
    WatchdogExpired { generation: u64 },
    /// Reply with the current state.
    Snapshot { resp_tx: Sender<RelaySnapshot> },
    /// Tear down and stop the owning thread.
    Release,
}
