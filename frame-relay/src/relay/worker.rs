// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Owning-thread loop.

use crossbeam_channel::Receiver;
use tracing::{debug, debug_span, trace};
use uuid::Uuid;

use super::{command::Command, state::RelayCore};

/// Applies commands to `core` in arrival order until released or until every
/// sender is gone.
pub(crate) fn relay_main(mut core: RelayCore, rx: Receiver<Command>, id: Uuid) {
    let span = debug_span!("frame_relay", id = %id);
    let _guard = span.enter();
    debug!("Relay thread started");

    while let Ok(command) = rx.recv() {
        if handle_command(&mut core, command) {
            break;
        }
    }

    core.release();
    debug!("Relay thread stopped");
}

/// Returns `true` when the loop should stop.
fn handle_command(core: &mut RelayCore, command: Command) -> bool {
    trace!(?command, "Handling command");
    match command {
        Command::FrameRegistered => core.on_frame_registered(),
        Command::FrameAvailable => core.on_frame_available(),
        Command::ReadyToAcceptInputFrame => core.on_ready_to_accept_input_frame(),
        Command::InputFrameProcessed(texture) => core.on_input_frame_processed(texture),
        Command::EndOfInput => core.signal_end_of_input(),
        Command::Flush => core.flush(),
        Command::SetDefaultBufferSize { width, height } => {
            core.set_default_buffer_size(width, height)
        }
        Command::WatchdogExpired { generation } => core.on_watchdog_expired(generation),
        Command::Snapshot { resp_tx } => {
            // The requester may have given up waiting.
            let _ = resp_tx.send(core.snapshot());
        }
        Command::Release => return true,
    }
    false
}
