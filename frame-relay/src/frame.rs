// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Frame metadata exchanged between the caller, the relay and the consumer.

use serde::{Deserialize, Serialize};

/// Sentinel for texture attachments that do not exist (no framebuffer or
/// renderbuffer is attached to an external texture).
pub const UNSET_ID: i32 = -1;

/// Describes one logical input frame before its pixels exist.
///
/// Registered with [`crate::FrameRelay::register_input_frame`] in presentation
/// order. The relay pairs each descriptor with the next physical frame the
/// producer makes available.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameInfo {
    /// Frame width in pixels.
    pub width: u32,

    /// Frame height in pixels.
    pub height: u32,

    /// Ratio of pixel width to pixel height.
    pub pixel_width_height_ratio: f32,

    /// Offset added to the producer timestamp, in microseconds.
    ///
    /// Removes the stream offset so that downstream stages see presentation
    /// times relative to the start of the current stream segment.
    pub offset_to_add_us: i64,
}

impl FrameInfo {
    /// Creates a descriptor with square pixels and no timestamp offset.
    pub fn new(width: u32, height: u32) -> Self {
        FrameInfo {
            width,
            height,
            pixel_width_height_ratio: 1.0,
            offset_to_add_us: 0,
        }
    }

    /// Returns a copy with the given timestamp offset.
    pub fn with_offset_to_add_us(mut self, offset_to_add_us: i64) -> Self {
        self.offset_to_add_us = offset_to_add_us;
        self
    }

    /// Returns a copy with the given pixel aspect ratio.
    pub fn with_pixel_width_height_ratio(mut self, ratio: f32) -> Self {
        self.pixel_width_height_ratio = ratio;
        self
    }

    /// Presentation time for a physical frame stamped `frame_time_ns`.
    ///
    /// Wraps on overflow instead of panicking; an out-of-range offset yields a
    /// meaningless timestamp but never stops the relay.
    pub fn presentation_time_us(&self, frame_time_ns: i64) -> i64 {
        (frame_time_ns / 1000).wrapping_add(self.offset_to_add_us)
    }
}

/// Handle to the texture a dispatched frame lives in.
///
/// Owned by the consumer from dispatch until it reports the frame processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputTexture {
    /// Texture name of the producer's external surface.
    pub tex_id: u32,

    /// Framebuffer attached to the texture, or [`UNSET_ID`].
    pub fbo_id: i32,

    /// Renderbuffer attached to the texture, or [`UNSET_ID`].
    pub rbo_id: i32,

    /// Width of the frame in pixels.
    pub width: u32,

    /// Height of the frame in pixels.
    pub height: u32,
}

impl InputTexture {
    /// Describes an external texture holding a frame of the given size.
    pub fn external(tex_id: u32, width: u32, height: u32) -> Self {
        InputTexture {
            tex_id,
            fbo_id: UNSET_ID,
            rbo_id: UNSET_ID,
            width,
            height,
        }
    }
}

/// Column-major 4x4 matrix mapping texture coordinates of the current physical
/// frame (orientation and cropping reported by the producer).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformMatrix(pub [f32; 16]);

impl TransformMatrix {
    /// The identity transform.
    pub const IDENTITY: TransformMatrix = TransformMatrix([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);
}

impl Default for TransformMatrix {
    fn default() -> Self {
        TransformMatrix::IDENTITY
    }
}
