// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Ordered queue of registered frames awaiting arrival and dispatch.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use crate::FrameInfo;

/// Thread-safe FIFO of [`FrameInfo`] descriptors.
///
/// Callers append from any thread while the relay's owning thread pops and
/// clears. The length can be read from any thread as a best-effort snapshot.
/// Cloning yields another handle to the same queue.
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    frames: Arc<Mutex<VecDeque<FrameInfo>>>,
}

impl PendingQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a descriptor at the tail.
    pub fn push(&self, frame: FrameInfo) {
        self.frames.lock().push_back(frame);
    }

    /// Removes and returns the oldest descriptor.
    pub fn pop(&self) -> Option<FrameInfo> {
        self.frames.lock().pop_front()
    }

    /// Returns a copy of the oldest descriptor without removing it.
    pub fn peek(&self) -> Option<FrameInfo> {
        self.frames.lock().front().copied()
    }

    /// Number of queued descriptors.
    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    /// Returns `true` if no descriptor is queued.
    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    /// Drops every queued descriptor and returns how many there were.
    pub fn clear(&self) -> usize {
        let mut frames = self.frames.lock();
        let count = frames.len();
        frames.clear();
        count
    }
}
