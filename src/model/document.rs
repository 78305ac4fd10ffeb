use std::sync::Arc;

use crate::assets::frames::{FrameSource, Raster};
use crate::foundation::core::{Canvas, LayerId, Vec2};
use crate::foundation::error::{LoopmaskError, LoopmaskResult};
use crate::model::layer::Layer;
use crate::model::mask::BrushDab;

/// An ordered stack of layers. Index 0 is the bottom of the stack and is the base layer.
///
/// Every mutation returns a new `Document`; `self` is never altered. The base layer cannot be
/// removed or reordered, so "first layer == base layer" holds for the lifetime of a document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    layers: Vec<Layer>,
    next_layer_id: u64,
}

impl Document {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Layers in draw order, bottom first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn base_layer(&self) -> Option<&Layer> {
        self.layers.first()
    }

    pub fn is_base_layer(&self, id: LayerId) -> bool {
        self.base_layer().is_some_and(|l| l.id() == id)
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    /// Canvas size, taken from the base layer's animation (empty until one is assigned).
    pub fn canvas(&self) -> Canvas {
        self.base_layer()
            .and_then(|l| l.frames())
            .map(|f| Canvas {
                width: f.width(),
                height: f.height(),
            })
            .unwrap_or_default()
    }

    pub fn width(&self) -> u32 {
        self.canvas().width
    }

    pub fn height(&self) -> u32 {
        self.canvas().height
    }

    /// Document-wide frame count: the longest layer animation, 0 with no animations.
    pub fn frame_count(&self) -> usize {
        self.layers
            .iter()
            .map(Layer::frame_count)
            .max()
            .unwrap_or(0)
    }

    /// Append a layer on top of the stack. The first layer added becomes the base layer.
    pub fn add_layer(&self, frames: Option<Arc<FrameSource>>) -> (Self, LayerId) {
        let id = LayerId(self.next_layer_id);
        let mut layer = Layer::new(id);
        if let Some(frames) = frames {
            layer = layer.with_frames(frames);
        }

        let mut layers = self.layers.clone();
        layers.push(layer);
        let doc = Self {
            layers,
            next_layer_id: self.next_layer_id + 1,
        };
        (doc, id)
    }

    /// Remove a non-base layer.
    pub fn remove_layer(&self, id: LayerId) -> LoopmaskResult<Self> {
        let index = self.require_index(id)?;
        if index == 0 {
            return Err(LoopmaskError::layer(id, "base layer cannot be removed"));
        }
        let mut layers = self.layers.clone();
        layers.remove(index);
        Ok(self.with_layers(layers))
    }

    /// Move a non-base layer to `index`; indices past the top are clamped to the top.
    ///
    /// Requests that target the base layer, or would move a layer beneath it, are rejected.
    pub fn move_layer(&self, id: LayerId, index: usize) -> LoopmaskResult<Self> {
        let from = self.require_index(id)?;
        if from == 0 {
            return Err(LoopmaskError::layer(id, "base layer cannot be reordered"));
        }
        if index == 0 {
            return Err(LoopmaskError::layer(
                id,
                "cannot move a layer beneath the base layer",
            ));
        }
        let to = index.min(self.layers.len() - 1);
        if to == from {
            return Ok(self.clone());
        }

        let mut layers = self.layers.clone();
        let layer = layers.remove(from);
        layers.insert(to, layer);
        Ok(self.with_layers(layers))
    }

    pub fn set_layer_frames(&self, id: LayerId, frames: Arc<FrameSource>) -> LoopmaskResult<Self> {
        self.update_layer(id, |l| l.with_frames(frames))
    }

    pub fn toggle_layer_visibility(&self, id: LayerId) -> LoopmaskResult<Self> {
        self.update_layer(id, |l| {
            let hidden = !l.is_hidden();
            l.with_hidden(hidden)
        })
    }

    pub fn set_layer_position(&self, id: LayerId, position: Vec2) -> LoopmaskResult<Self> {
        self.update_layer(id, |l| l.with_position(position))
    }

    pub fn set_layer_scale(&self, id: LayerId, scale: Vec2) -> LoopmaskResult<Self> {
        if !(scale.x.is_finite() && scale.y.is_finite()) {
            return Err(LoopmaskError::validation(format!(
                "layer scale must be finite, got ({}, {})",
                scale.x, scale.y
            )));
        }
        self.update_layer(id, |l| l.with_scale(scale))
    }

    pub fn set_layer_mask(&self, id: LayerId, mask: Option<Raster>) -> LoopmaskResult<Self> {
        self.update_layer(id, |l| l.with_mask(mask))
    }

    pub fn paint_layer_mask(&self, id: LayerId, dab: &BrushDab) -> LoopmaskResult<Self> {
        self.update_layer(id, |l| l.with_mask_dab(dab))
    }

    /// Replace one layer with `f(layer)`. `f` must keep the layer's identity.
    pub fn update_layer(
        &self,
        id: LayerId,
        f: impl FnOnce(Layer) -> Layer,
    ) -> LoopmaskResult<Self> {
        let index = self.require_index(id)?;
        let updated = f(self.layers[index].clone());
        if updated.id() != id {
            return Err(LoopmaskError::layer(
                id,
                format!("update replaced the layer with {}", updated.id()),
            ));
        }
        let mut layers = self.layers.clone();
        layers[index] = updated;
        Ok(self.with_layers(layers))
    }

    fn require_index(&self, id: LayerId) -> LoopmaskResult<usize> {
        self.layer_index(id)
            .ok_or_else(|| LoopmaskError::layer(id, "no such layer"))
    }

    fn with_layers(&self, layers: Vec<Layer>) -> Self {
        Self {
            layers,
            next_layer_id: self.next_layer_id,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/document.rs"]
mod tests;
