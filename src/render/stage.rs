use std::sync::Arc;

use crate::foundation::core::Rgba8Premul;
use crate::foundation::math::unpremultiply_rgba8_in_place;

/// Reusable `vello_cpu` context plus the pixmap it renders into.
///
/// Every draw starts from a transparent target. Callers read the rasterized coverage back and
/// combine it with their own pixels, so blending rules stay under this crate's control.
#[derive(Default)]
pub(crate) struct Stage {
    ctx: Option<vello_cpu::RenderContext>,
    target: Option<vello_cpu::Pixmap>,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field(
                "size",
                &self.target.as_ref().map(|p| (p.width(), p.height())),
            )
            .finish_non_exhaustive()
    }
}

impl Stage {
    /// Run `draw` against a `width x height` context and return the rendered pixels.
    ///
    /// `None` for an empty target.
    pub(crate) fn rasterize(
        &mut self,
        width: u16,
        height: u16,
        draw: impl FnOnce(&mut vello_cpu::RenderContext),
    ) -> Option<&vello_cpu::Pixmap> {
        if width == 0 || height == 0 {
            return None;
        }

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        draw(&mut ctx);
        ctx.flush();

        let mut target = match self.target.take() {
            Some(p) if p.width() == width && p.height() == height => p,
            _ => vello_cpu::Pixmap::new(width, height),
        };
        target.data_as_u8_slice_mut().fill(0);
        ctx.render_to_pixmap(&mut target);

        self.ctx = Some(ctx);
        Some(&*self.target.insert(target))
    }
}

/// Nearest-neighbour image paint over premultiplied RGBA8 bytes.
///
/// `None` when the image is empty or too large for a `vello_cpu` pixmap.
pub(crate) fn image_paint(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> Option<vello_cpu::Image> {
    let w = u16::try_from(width).ok()?;
    let h = u16::try_from(height).ok()?;
    if w == 0 || h == 0 || rgba8_premul.len() != usize::from(w) * usize::from(h) * 4 {
        return None;
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(usize::from(w) * usize::from(h));
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);

    Some(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler {
            quality: vello_cpu::peniko::ImageQuality::Low,
            ..vello_cpu::peniko::ImageSampler::default()
        },
    })
}

/// Solid paint for a premultiplied color.
pub(crate) fn solid_paint(px: Rgba8Premul) -> vello_cpu::peniko::Color {
    let mut straight = px.to_array();
    unpremultiply_rgba8_in_place(&mut straight);
    let [r, g, b, a] = straight;
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}
