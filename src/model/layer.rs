use std::sync::Arc;

use crate::assets::frames::{Frame, FrameSource, Raster};
use crate::foundation::core::{LayerId, Vec2};
use crate::model::mask::{BrushDab, paint_dab};

/// A positioned, scaled, optionally masked animation within a [`crate::Document`].
///
/// Layers are values: every `with_*` method consumes the layer and returns an updated copy.
/// The frame source is shared, the mask is owned (cloned lazily on first write).
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    id: LayerId,
    frames: Option<Arc<FrameSource>>,
    position: Vec2,
    scale: Vec2,
    hidden: bool,
    mask: Option<Arc<Raster>>,
    width: u32,
    height: u32,
}

impl Layer {
    /// A visible, unscaled layer at the origin with nothing assigned yet.
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            frames: None,
            position: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
            hidden: false,
            mask: None,
            width: 0,
            height: 0,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn frames(&self) -> Option<&Arc<FrameSource>> {
        self.frames.as_ref()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn mask(&self) -> Option<&Raster> {
        self.mask.as_deref()
    }

    /// Own width in pixels, before scale.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Own height in pixels, before scale.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frame count of the assigned source, 0 when none is assigned.
    pub fn frame_count(&self) -> usize {
        self.frames.as_ref().map_or(0, |f| f.frame_count())
    }

    /// Frame shown at the document-wide `cursor`.
    pub fn frame_at(&self, cursor: u64) -> Option<&Frame> {
        self.frames.as_ref().and_then(|f| f.frame_at(cursor))
    }

    /// Assign an animation. The layer takes on the source's intrinsic size.
    pub fn with_frames(mut self, frames: Arc<FrameSource>) -> Self {
        self.width = frames.width();
        self.height = frames.height();
        self.frames = Some(frames);
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_mask(mut self, mask: Option<Raster>) -> Self {
        self.mask = mask.map(Arc::new);
        self
    }

    /// Stamp `dab` into the mask, creating a transparent mask of the layer's size first if the
    /// layer has none.
    pub fn with_mask_dab(mut self, dab: &BrushDab) -> Self {
        let (w, h) = (self.width, self.height);
        let mask = self
            .mask
            .get_or_insert_with(|| Arc::new(Raster::transparent(w, h)));
        paint_dab(Arc::make_mut(mask), dab);
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/layer.rs"]
mod tests;
