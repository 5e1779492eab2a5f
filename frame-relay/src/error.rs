// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for frame relay operations.
//!
//! Only a small set of conditions ever reaches the caller. Stalled streams,
//! stray arrivals and post-flush races are absorbed by the relay and show up as
//! log records and [`crate::RelayEvent`]s instead.

/// Boxed error returned by collaborators (for example a producer that could not
/// allocate its surface).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur when using a [`crate::FrameRelay`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The producer could not create the surface frames are written into.
    ///
    /// This is the only failure surfaced while constructing a relay.
    #[error("Failed to create producer surface: {0}")]
    SurfaceCreation(#[source] BoxError),

    /// The relay has been released and no longer accepts calls.
    #[error("Frame relay has been released")]
    Released,

    /// The owning thread or the watchdog timer thread could not be started.
    #[error("Failed to spawn relay thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),

    /// A generic error for failures not covered by the other variants.
    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Wraps a producer failure raised while creating its surface.
    pub fn surface_creation<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::SurfaceCreation(error.into())
    }

    /// Returns `true` if this error reports use of a released relay.
    pub fn is_released(&self) -> bool {
        matches!(self, Error::Released)
    }
}
