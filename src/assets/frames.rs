use std::sync::OnceLock;

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{LoopmaskError, LoopmaskResult};
use crate::render::stage::image_paint;

/// A premultiplied RGBA8 pixel buffer, tightly packed and row-major.
///
/// The `vello_cpu` image paint used to draw the raster is built on first use and dropped
/// whenever the pixels are written.
#[derive(Clone)]
pub struct Raster {
    width: u32,
    height: u32,
    rgba8_premul: Vec<u8>,
    paint: OnceLock<Option<vello_cpu::Image>>,
}

impl PartialEq for Raster {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.rgba8_premul == other.rgba8_premul
    }
}

impl Eq for Raster {}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba8_premul.len())
            .finish()
    }
}

impl Raster {
    /// Wrap existing premultiplied pixels. The buffer must hold exactly `width * height * 4` bytes
    /// and each side must fit in a `u16`.
    pub fn new(width: u32, height: u32, rgba8_premul: Vec<u8>) -> LoopmaskResult<Self> {
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(LoopmaskError::validation(format!(
                "raster {width}x{height} exceeds {} pixels per side",
                u16::MAX
            )));
        }
        let expected = byte_len(width, height)
            .ok_or_else(|| LoopmaskError::validation("raster dimensions overflow"))?;
        if rgba8_premul.len() != expected {
            return Err(LoopmaskError::validation(format!(
                "raster {width}x{height} expects {expected} bytes, got {}",
                rgba8_premul.len()
            )));
        }
        Ok(Self::from_parts(width, height, rgba8_premul))
    }

    /// A fully transparent raster.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba8Premul::transparent())
    }

    pub fn filled(width: u32, height: u32, px: Rgba8Premul) -> Self {
        let count = (width as usize).saturating_mul(height as usize);
        Self::from_parts(width, height, px.to_array().repeat(count))
    }

    fn from_parts(width: u32, height: u32, rgba8_premul: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba8_premul,
            paint: OnceLock::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.rgba8_premul
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.paint = OnceLock::new();
        &mut self.rgba8_premul
    }

    /// Image paint for drawing this raster, or `None` when it cannot be drawn.
    pub(crate) fn paint(&self) -> Option<&vello_cpu::Image> {
        self.paint
            .get_or_init(|| image_paint(&self.rgba8_premul, self.width, self.height))
            .as_ref()
    }

    /// Pixel at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.rgba8_premul[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }
}

pub(crate) fn byte_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(4))
}

/// Resolve a document-wide `cursor` against a sequence of `frame_count` frames.
///
/// Returns `None` for an empty sequence.
pub fn resolve_frame_index(cursor: u64, frame_count: usize) -> Option<usize> {
    let n = frame_count as u64;
    if n == 0 {
        return None;
    }
    Some((cursor % n) as usize)
}

/// One frame of an animation: pixels plus its intrinsic display duration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub raster: Raster,
    /// Display duration in hundredths of a second. 0 means unspecified.
    pub duration: u32,
}

/// An immutable decoded animation.
///
/// Sources are shared between layers through `Arc<FrameSource>`; nothing mutates one after
/// it is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSource {
    width: u32,
    height: u32,
    frames: Vec<Frame>,
}

impl FrameSource {
    /// Assemble a source from already-decoded frames.
    ///
    /// Decoders never produce an empty source; an empty frame list is accepted here and simply
    /// renders nothing.
    pub fn new(width: u32, height: u32, frames: Vec<Frame>) -> Self {
        Self {
            width,
            height,
            frames,
        }
    }

    /// Single-frame source with an unspecified duration.
    pub fn still(raster: Raster) -> Self {
        Self {
            width: raster.width(),
            height: raster.height(),
            frames: vec![Frame {
                raster,
                duration: 0,
            }],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Index of the frame shown at a document-wide `cursor`.
    ///
    /// Shorter sources wrap around rather than clamping, so every layer keeps looping while
    /// staying phase-aligned with the shared cursor.
    pub fn frame_index_at(&self, cursor: u64) -> Option<usize> {
        resolve_frame_index(cursor, self.frames.len())
    }

    pub fn frame_at(&self, cursor: u64) -> Option<&Frame> {
        self.frame_index_at(cursor).and_then(|i| self.frames.get(i))
    }

    /// Sum of all frame durations, in hundredths of a second.
    pub fn total_duration(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.duration)).sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/frames.rs"]
mod tests;
