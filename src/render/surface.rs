use std::ops::{Deref, DerefMut, Range};
use std::path::Path;

use anyhow::Context;

use crate::assets::frames::Raster;
use crate::foundation::core::{Rect, Rgba8Premul};
use crate::foundation::error::LoopmaskResult;
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::blend::{self, PremulRgba8};
use crate::render::stage::{Stage, solid_paint};

/// Largest width or height a [`Surface`] takes; larger requests are clamped.
pub const MAX_SURFACE_DIM: u32 = 8192;

/// How incoming pixels combine with the pixels already on a [`Surface`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompositeMode {
    /// Draw on top of existing content.
    #[default]
    SourceOver,
    /// Keep incoming pixels only where the surface already has coverage.
    SourceIn,
}

impl CompositeMode {
    fn combine_fn(self) -> fn(PremulRgba8, PremulRgba8) -> PremulRgba8 {
        match self {
            Self::SourceOver => blend::over,
            Self::SourceIn => blend::source_in,
        }
    }
}

/// A mutable premultiplied RGBA8 drawing target backed by a `vello_cpu` pixmap.
///
/// Geometry (scaled images, outlines) is rasterized by `vello_cpu` into a reused stage pixmap;
/// the result is then combined into the surface according to the current [`CompositeMode`],
/// only inside the pixel bounds of the draw. The mode is only changed through
/// [`Surface::with_mode`], which restores the previous mode when the returned guard is dropped.
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
    mode: CompositeMode,
    stage: Stage,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

fn clamp_dim(v: u32) -> u16 {
    v.min(MAX_SURFACE_DIM) as u16
}

impl Surface {
    /// A transparent surface. Each side is clamped to [`MAX_SURFACE_DIM`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixmap: vello_cpu::Pixmap::new(clamp_dim(width), clamp_dim(height)),
            mode: CompositeMode::SourceOver,
            stage: Stage::default(),
        }
    }

    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    pub fn mode(&self) -> CompositeMode {
        self.mode
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = (y as usize * self.width() as usize + x as usize) * 4;
        let p = &self.as_bytes()[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Change dimensions and clear. The pixmap is only reallocated when the size changes.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (w, h) = (clamp_dim(width), clamp_dim(height));
        if self.pixmap.width() == w && self.pixmap.height() == h {
            self.clear();
        } else {
            self.pixmap = vello_cpu::Pixmap::new(w, h);
        }
    }

    /// Make every pixel transparent.
    pub fn clear(&mut self) {
        self.pixmap.data_as_u8_slice_mut().fill(0);
    }

    pub fn fill(&mut self, px: Rgba8Premul) {
        let px = px.to_array();
        for d in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    /// Switch the composite mode for the lifetime of the returned guard.
    pub fn with_mode(&mut self, mode: CompositeMode) -> ModeScope<'_> {
        let restore = self.mode;
        self.mode = mode;
        ModeScope {
            surface: self,
            restore,
        }
    }

    /// Draw `src` stretched over `dest` with nearest-neighbour sampling.
    ///
    /// A reversed `dest` (`x1 < x0` or `y1 < y0`) mirrors the image along that axis.
    pub fn blit(&mut self, src: &Raster, dest: Rect) {
        let bounds = dest.abs();
        if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
            return;
        }
        let (width, height) = (self.width(), self.height());
        let xs = pixel_span(bounds.x0, bounds.x1, width);
        let ys = pixel_span(bounds.y0, bounds.y1, height);
        if xs.is_empty() || ys.is_empty() {
            return;
        }
        let Some(paint) = src.paint() else {
            return;
        };

        let sx = (dest.x1 - dest.x0) / f64::from(src.width());
        let sy = (dest.y1 - dest.y0) / f64::from(src.height());
        let image_to_dest = vello_cpu::kurbo::Affine::new([sx, 0.0, 0.0, sy, dest.x0, dest.y0]);
        // Geometry stays within a pixel of the surface; the paint transform places the image.
        let visible = vello_cpu::kurbo::Rect::new(
            bounds.x0.max(-1.0),
            bounds.y0.max(-1.0),
            bounds.x1.min(f64::from(width) + 1.0),
            bounds.y1.min(f64::from(height) + 1.0),
        );

        let (w16, h16) = (self.pixmap.width(), self.pixmap.height());
        let Some(layer) = self.stage.rasterize(w16, h16, |ctx| {
            ctx.set_paint_transform(image_to_dest);
            ctx.set_paint(paint.clone());
            ctx.fill_rect(&visible);
        }) else {
            return;
        };
        combine_region(
            self.pixmap.data_as_u8_slice_mut(),
            layer.data_as_u8_slice(),
            width,
            xs,
            ys,
            self.mode.combine_fn(),
        );
    }

    /// Draw `mask` over `dest`, then draw `src` clipped to the mask's alpha footprint.
    pub fn blit_masked(&mut self, src: &Raster, mask: &Raster, dest: Rect) {
        self.blit(mask, dest);
        let mut clipped = self.with_mode(CompositeMode::SourceIn);
        clipped.blit(src, dest);
    }

    /// Composite another surface with its top-left corner at `(x, y)`.
    pub fn draw_surface(&mut self, src: &Surface, x: i64, y: i64) {
        let (dw, dh) = (i64::from(self.width()), i64::from(self.height()));
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(i64::from(src.width())).min(dw);
        let y1 = y.saturating_add(i64::from(src.height())).min(dh);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let combine = self.mode.combine_fn();
        let src_stride = src.width() as usize * 4;
        let dst_stride = dw as usize * 4;
        let src_bytes = src.as_bytes();
        let dst = self.pixmap.data_as_u8_slice_mut();
        for dy in y0..y1 {
            let sy = (dy - y) as usize;
            for dx in x0..x1 {
                let sx = (dx - x) as usize;
                let si = sy * src_stride + sx * 4;
                let di = dy as usize * dst_stride + dx as usize * 4;
                combine_px(dst, di, &src_bytes[si..si + 4], combine);
            }
        }
    }

    /// Stroke a one pixel outline along the inside edge of `rect`'s pixel bounds.
    ///
    /// Always source-over. Edges that fall outside the surface are not drawn.
    pub fn stroke_rect(&mut self, rect: Rect, color: Rgba8Premul) {
        if rect.is_nan() {
            return;
        }
        let (width, height) = (self.width(), self.height());
        let rect = rect.abs();
        let x0 = rect.x0.floor().max(-1.0);
        let y0 = rect.y0.floor().max(-1.0);
        let x1 = rect.x1.ceil().min(f64::from(width) + 1.0);
        let y1 = rect.y1.ceil().min(f64::from(height) + 1.0);
        if !(x1 - x0 >= 1.0 && y1 - y0 >= 1.0) {
            return;
        }

        let mut edges = vec![vello_cpu::kurbo::Rect::new(x0, y0, x1, y0 + 1.0)];
        if y1 - y0 > 1.0 {
            edges.push(vello_cpu::kurbo::Rect::new(x0, y1 - 1.0, x1, y1));
        }
        if y1 - y0 > 2.0 {
            edges.push(vello_cpu::kurbo::Rect::new(x0, y0 + 1.0, x0 + 1.0, y1 - 1.0));
            if x1 - x0 > 1.0 {
                edges.push(vello_cpu::kurbo::Rect::new(x1 - 1.0, y0 + 1.0, x1, y1 - 1.0));
            }
        }

        let xs = pixel_span(x0, x1, width);
        let ys = pixel_span(y0, y1, height);
        if xs.is_empty() || ys.is_empty() {
            return;
        }
        let paint = solid_paint(color);
        let (w16, h16) = (self.pixmap.width(), self.pixmap.height());
        let Some(layer) = self.stage.rasterize(w16, h16, |ctx| {
            ctx.set_paint(paint);
            for edge in &edges {
                ctx.fill_rect(edge);
            }
        }) else {
            return;
        };
        combine_region(
            self.pixmap.data_as_u8_slice_mut(),
            layer.data_as_u8_slice(),
            width,
            xs,
            ys,
            blend::over,
        );
    }

    /// Copy of the pixels with premultiplication undone, ready for PNG and friends.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.as_bytes().to_vec();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> LoopmaskResult<()> {
        let path = path.as_ref();
        image::save_buffer_with_format(
            path,
            &self.to_straight_rgba8(),
            self.width(),
            self.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Restores the surface's previous [`CompositeMode`] on drop.
pub struct ModeScope<'a> {
    surface: &'a mut Surface,
    restore: CompositeMode,
}

impl Deref for ModeScope<'_> {
    type Target = Surface;

    fn deref(&self) -> &Surface {
        self.surface
    }
}

impl DerefMut for ModeScope<'_> {
    fn deref_mut(&mut self) -> &mut Surface {
        self.surface
    }
}

impl Drop for ModeScope<'_> {
    fn drop(&mut self) {
        self.surface.mode = self.restore;
    }
}

/// Pixel columns (or rows) touched by `[lo, hi)`, clipped to `[0, limit)`.
fn pixel_span(lo: f64, hi: f64, limit: u32) -> Range<u32> {
    let limit = f64::from(limit);
    let start = lo.floor().clamp(0.0, limit) as u32;
    let end = hi.ceil().clamp(0.0, limit) as u32;
    start..end.max(start)
}

fn combine_region(
    dst: &mut [u8],
    src: &[u8],
    width: u32,
    xs: Range<u32>,
    ys: Range<u32>,
    combine: fn(PremulRgba8, PremulRgba8) -> PremulRgba8,
) {
    let stride = width as usize * 4;
    for y in ys {
        let row = y as usize * stride;
        for x in xs.clone() {
            let i = row + x as usize * 4;
            combine_px(dst, i, &src[i..i + 4], combine);
        }
    }
}

fn combine_px(
    dst: &mut [u8],
    i: usize,
    src: &[u8],
    combine: fn(PremulRgba8, PremulRgba8) -> PremulRgba8,
) {
    let d = [dst[i], dst[i + 1], dst[i + 2], dst[i + 3]];
    let s = [src[0], src[1], src[2], src[3]];
    dst[i..i + 4].copy_from_slice(&combine(d, s));
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
