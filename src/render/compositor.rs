use std::collections::BTreeSet;

use crate::assets::frames::Raster;
use crate::foundation::core::{LayerId, Rect, Rgba8Premul};
use crate::model::document::Document;
use crate::model::layer::Layer;
use crate::render::surface::{MAX_SURFACE_DIM, Surface};

/// Outline color used for highlighted layers.
pub const BORDER_RGBA: Rgba8Premul = Rgba8Premul::opaque(255, 0, 0);

/// Per-call presentation options for [`Compositor::render`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Layers that get a highlight outline drawn above all content.
    pub show_borders_for: BTreeSet<LayerId>,
    /// Layer whose mask is drawn in place of its masked frame.
    pub mask_preview: Option<LayerId>,
}

impl RenderOptions {
    pub fn with_border(mut self, id: LayerId) -> Self {
        self.show_borders_for.insert(id);
        self
    }
}

/// Composites a [`Document`] at a frame cursor into a caller-owned [`Surface`].
///
/// Each layer is first drawn alone into a scratch surface (mask, then the frame clipped to it)
/// and the scratch is then laid over the output, so masking never eats into layers below.
/// The scratch is owned by the compositor and reused across calls; use one compositor per
/// concurrent renderer.
#[derive(Debug)]
pub struct Compositor {
    scratch: Surface,
    reveal: Raster,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            scratch: Surface::new(0, 0),
            reveal: Raster::filled(1, 1, Rgba8Premul::opaque(255, 255, 255)),
        }
    }

    /// Draw `doc` at `frame_cursor` into `out`, scaled by `zoom`.
    ///
    /// Layers without an animation, hidden layers and animations without frames are skipped.
    /// `out` is only drawn into, never resized or cleared.
    #[tracing::instrument(level = "trace", skip(self, doc, out, opts), fields(layers = doc.len()))]
    pub fn render(
        &mut self,
        doc: &Document,
        frame_cursor: u64,
        zoom: f64,
        out: &mut Surface,
        opts: &RenderOptions,
    ) {
        if !(zoom.is_finite() && zoom > 0.0) {
            tracing::warn!(zoom, "skipping render with non-positive zoom");
            return;
        }

        let (width, height) = doc.canvas().scaled(zoom);
        if width > MAX_SURFACE_DIM || height > MAX_SURFACE_DIM {
            tracing::warn!(width, height, zoom, "skipping render larger than the surface limit");
            return;
        }
        self.scratch.resize(width, height);

        for layer in doc.layers() {
            if layer.is_hidden() {
                tracing::trace!(layer = %layer.id(), "hidden");
                continue;
            }
            let Some(frame) = layer.frame_at(frame_cursor) else {
                tracing::trace!(layer = %layer.id(), "nothing to draw");
                continue;
            };

            let is_base = doc.is_base_layer(layer.id());
            let rect = content_rect(layer, is_base, zoom);

            self.scratch.clear();
            if is_base {
                self.scratch.blit(&frame.raster, rect);
            } else if opts.mask_preview == Some(layer.id()) {
                let mask = layer.mask().unwrap_or(&self.reveal);
                self.scratch.blit(mask, rect);
            } else if let Some(mask) = layer.mask() {
                self.scratch.blit_masked(&frame.raster, mask, rect);
            } else {
                self.scratch.blit(&frame.raster, rect);
            }

            out.draw_surface(&self.scratch, 0, 0);
        }

        for layer in doc.layers() {
            if opts.show_borders_for.contains(&layer.id()) {
                let rect = border_rect(layer, doc.is_base_layer(layer.id()), zoom);
                out.stroke_rect(rect, BORDER_RGBA);
            }
        }
    }
}

/// Where a layer's animation lands on the zoomed canvas.
///
/// The base layer always sits at the origin; its stored position is ignored. A negative scale
/// yields a reversed rect (`x1 < x0` or `y1 < y0`), which [`Surface::blit`] draws mirrored.
pub fn content_rect(layer: &Layer, is_base: bool, zoom: f64) -> Rect {
    let (w, h) = layer
        .frames()
        .map_or((0, 0), |f| (f.width(), f.height()));
    scaled_rect(layer, is_base, zoom, w, h)
}

/// Highlight outline around a layer's own footprint, one pixel outside on every side.
pub fn border_rect(layer: &Layer, is_base: bool, zoom: f64) -> Rect {
    scaled_rect(layer, is_base, zoom, layer.width(), layer.height())
        .abs()
        .inflate(1.0, 1.0)
}

fn scaled_rect(layer: &Layer, is_base: bool, zoom: f64, w: u32, h: u32) -> Rect {
    let origin = if is_base {
        kurbo::Point::ZERO
    } else {
        (layer.position() * zoom).to_point()
    };
    let extent = kurbo::Vec2::new(
        f64::from(w) * layer.scale().x * zoom,
        f64::from(h) * layer.scale().y * zoom,
    );
    let end = origin + extent;
    Rect::new(origin.x, origin.y, end.x, end.y)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
