use vello_cpu::kurbo::{Circle, Shape};

use crate::assets::frames::Raster;
use crate::foundation::core::{Point, Rgba8Premul};
use crate::render::blend;
use crate::render::stage::{Stage, solid_paint};

/// Mask painting tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DrawingTool {
    /// Reveal the layer: paints opaque coverage into the mask.
    #[default]
    Brush,
    /// Hide the layer: clears mask coverage.
    Eraser,
}

/// A single round stamp of the mask brush.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushDab {
    /// Center in layer-local pixels, before the layer's scale is applied.
    pub center: Point,
    /// Stamp diameter in layer-local pixels.
    pub diameter: f64,
    pub tool: DrawingTool,
}

const REVEAL: Rgba8Premul = Rgba8Premul::opaque(255, 255, 255);

/// Larger radii are drawn at this size, which still covers any mask a dab can reach.
const MAX_DAB_RADIUS: f64 = 262_144.0;

/// Stamp an antialiased disc into `mask`. Brush composites coverage over the mask, eraser
/// removes the mask by the disc's coverage.
pub(crate) fn paint_dab(mask: &mut Raster, dab: &BrushDab) {
    if !(dab.diameter > 0.0) || mask.is_empty() {
        return;
    }
    let radius = (dab.diameter / 2.0).min(MAX_DAB_RADIUS);

    let (w, h) = (mask.width(), mask.height());
    let x0 = (dab.center.x - radius).floor().clamp(0.0, f64::from(w)) as u32;
    let y0 = (dab.center.y - radius).floor().clamp(0.0, f64::from(h)) as u32;
    let x1 = (dab.center.x + radius).ceil().clamp(0.0, f64::from(w)) as u32;
    let y1 = (dab.center.y + radius).ceil().clamp(0.0, f64::from(h)) as u32;
    let (Ok(bw), Ok(bh)) = (u16::try_from(x1 - x0), u16::try_from(y1 - y0)) else {
        return;
    };

    let disc = Circle::new(
        (dab.center.x - f64::from(x0), dab.center.y - f64::from(y0)),
        radius,
    )
    .to_path(0.1);
    let mut stage = Stage::default();
    let Some(coverage) = stage.rasterize(bw, bh, |ctx| {
        ctx.set_paint(solid_paint(REVEAL));
        ctx.fill_path(&disc);
    }) else {
        return;
    };

    let combine = match dab.tool {
        DrawingTool::Brush => blend::over,
        DrawingTool::Eraser => blend::destination_out,
    };
    let stride = w as usize * 4;
    let cov = coverage.data_as_u8_slice();
    let bytes = mask.as_bytes_mut();
    for (row, y) in (y0..y1).enumerate() {
        for (col, x) in (x0..x1).enumerate() {
            let ci = (row * usize::from(bw) + col) * 4;
            let c = [cov[ci], cov[ci + 1], cov[ci + 2], cov[ci + 3]];
            if c[3] == 0 {
                continue;
            }
            let i = y as usize * stride + x as usize * 4;
            let d = [bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]];
            bytes[i..i + 4].copy_from_slice(&combine(d, c));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/mask.rs"]
mod tests;
