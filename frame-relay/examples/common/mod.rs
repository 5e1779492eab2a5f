// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Helpers shared by the frame relay examples.

use tracing_subscriber::EnvFilter;

/// Sends logs to stderr, keeping stdout free for the JSON event log.
///
/// Warnings from the relay (forced terminations, rejected frames) are always
/// shown. `RUST_LOG` overrides the filter, for example
/// `RUST_LOG=frame_relay=trace` to follow every dispatch.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,simulate=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
