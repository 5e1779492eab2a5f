// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! # Frame Relay
//!
//! Pairs video frames produced asynchronously (typically by a hardware decoder
//! rendering into a GPU surface) with caller-supplied metadata and hands them,
//! one at a time, to a downstream consumer with limited capacity.
//!
//! ## Overview
//!
//! The caller registers a [`FrameInfo`] for every frame it feeds to the
//! producer. Frames come out of the producer in the same order, so the relay
//! matches each physical frame with the oldest pending descriptor, computes its
//! presentation time and queues it to the consumer once the consumer has room.
//!
//! ### Key Concepts
//!
//! - **Producer**: Renders frames into a surface and announces each one through an [`ArrivalNotifier`] ([`FrameProducer`])
//! - **Consumer**: Accepts one frame at a time and reports capacity and completion through a [`ConsumerLink`] ([`FrameConsumer`])
//! - **Pending queue**: Descriptors registered but not yet dispatched ([`PendingQueue`])
//! - **Watchdog**: Forces end of stream when frames stop arriving after end of input
//!
//! ## Architecture
//!
//! ```text
//!                  register_input_frame
//!  caller ─────────────────────────────────► PendingQueue
//!                                                │
//!  FrameProducer ── ArrivalNotifier ──┐          │
//!                                     ▼          ▼
//!  ConsumerLink ──────────────────► owning thread (RelayCore) ──► FrameConsumer
//!                                     ▲
//!  watchdog timer ────────────────────┘
//! ```
//!
//! Every notification becomes a task on the relay's owning thread and runs in
//! the order it was posted. Only that thread touches relay state.
//!
//! ## Examples
//!
//! ```no_run
//! use frame_relay::{
//!     ArrivalNotifier, BoxError, FrameConsumer, FrameInfo, FrameProducer, FrameRelay,
//!     InputTexture, TransformMatrix, config::RelayConfig,
//! };
//!
//! struct Decoder;
//!
//! impl FrameProducer for Decoder {
//!     fn create_surface(&mut self, _notifier: ArrivalNotifier) -> Result<u32, BoxError> {
//!         Ok(1)
//!     }
//!     fn set_default_buffer_size(&mut self, _width: u32, _height: u32) {}
//!     fn claim_frame(&mut self) -> i64 {
//!         0
//!     }
//!     fn transform_matrix(&self) -> TransformMatrix {
//!         TransformMatrix::IDENTITY
//!     }
//!     fn release(&mut self) {}
//! }
//!
//! struct Encoder;
//!
//! impl FrameConsumer for Encoder {
//!     fn queue_input_frame(&mut self, texture: InputTexture, presentation_time_us: i64) {
//!         println!("{} at {presentation_time_us} us", texture.tex_id);
//!     }
//!     fn signal_end_of_current_input_stream(&mut self) {}
//! }
//!
//! # fn main() -> Result<(), frame_relay::Error> {
//! let relay = FrameRelay::new(RelayConfig::default(), Decoder, Encoder)?;
//! let link = relay.consumer_link();
//!
//! relay.register_input_frame(FrameInfo::new(1920, 1080))?;
//! link.on_ready_to_accept_input_frame()?;
//! relay.signal_end_of_current_input_stream()?;
//! relay.release()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate logs through [`tracing`]. Forced stream terminations and dropped
//! frames are reported at `WARN`; stream and flush transitions at `DEBUG`;
//! per-frame dispatch at `TRACE`. Records emitted on the owning thread carry a
//! `frame_relay` span with the relay's id.

mod consumer;
mod error;
mod events;
mod frame;
mod notifier;
mod pending;
mod producer;
mod relay;
mod watchdog;

#[cfg(test)]
mod testing;

pub mod config;

pub use consumer::{ConsumerLink, FrameConsumer};
pub use error::{BoxError, Error, Result};
pub use events::{DropReason, RelayEvent, RelayEventCallback, RelayPhase, RelaySnapshot};
pub use frame::{FrameInfo, InputTexture, TransformMatrix, UNSET_ID};
pub use notifier::ArrivalNotifier;
pub use pending::PendingQueue;
pub use producer::FrameProducer;
pub use relay::FrameRelay;
