// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Producer-side collaborator interface.
//!
//! A producer is typically a hardware decoder rendering into a GPU-backed
//! surface. It announces each new physical frame through an
//! [`ArrivalNotifier`] and hands the frame over when the relay claims it.

use crate::{ArrivalNotifier, BoxError, TransformMatrix};

/// Source of physical frames consumed by a [`crate::FrameRelay`].
///
/// Every method except [`FrameProducer::create_surface`] is called on the
/// relay's owning thread. The producer is free to call the notifier from any
/// thread.
pub trait FrameProducer: Send + 'static {
    /// Allocates the surface frames are rendered into and returns the name of
    /// the texture backing it.
    ///
    /// Called once, on the thread constructing the relay. The producer keeps
    /// `notifier` and invokes it once per frame that becomes available.
    ///
    /// # Errors
    ///
    /// Any error aborts relay construction with
    /// [`crate::Error::SurfaceCreation`].
    fn create_surface(&mut self, notifier: ArrivalNotifier) -> Result<u32, BoxError>;

    /// Sets the default size of buffers the producer renders into.
    fn set_default_buffer_size(&mut self, width: u32, height: u32);

    /// Claims the oldest available physical frame, latching it into the
    /// surface texture, and returns its timestamp in nanoseconds.
    ///
    /// Claiming is destructive: the frame leaves the producer's backlog whether
    /// or not the relay forwards it.
    fn claim_frame(&mut self) -> i64;

    /// Texture coordinate transform of the most recently claimed frame.
    fn transform_matrix(&self) -> TransformMatrix;

    /// Releases the surface and any producer-side resources.
    fn release(&mut self);
}
