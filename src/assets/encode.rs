use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;

use crate::{
    assets::frames::{FrameSource, Raster},
    foundation::error::{LoopmaskError, LoopmaskResult},
    foundation::math::unpremultiply_rgba8_in_place,
};

/// Encode every frame of `source` as a looping GIF.
///
/// Frames smaller than the source are placed at the top-left of a transparent canvas. GIF keeps
/// one bit of alpha and at most 256 colors per frame, so translucent pixels are quantized.
pub fn encode_animation<W: Write>(source: &FrameSource, out: W) -> LoopmaskResult<()> {
    if source.frame_count() == 0 {
        return Err(LoopmaskError::validation("animation has no frames to encode"));
    }

    let (width, height) = (source.width(), source.height());
    let mut frames = Vec::with_capacity(source.frame_count());
    for frame in source.frames() {
        let mut canvas = image::RgbaImage::new(width, height);
        let straight = straight_rgba8(&frame.raster);
        let row = frame.raster.width() as usize * 4;
        for (y, src) in straight.chunks_exact(row.max(1)).enumerate() {
            let y = y as u32;
            if y >= height {
                break;
            }
            for (x, px) in src.chunks_exact(4).enumerate() {
                let x = x as u32;
                if x < width {
                    canvas.put_pixel(x, y, image::Rgba([px[0], px[1], px[2], px[3]]));
                }
            }
        }
        let delay = image::Delay::from_numer_denom_ms(frame.duration.saturating_mul(10), 1);
        frames.push(image::Frame::from_parts(canvas, 0, 0, delay));
    }

    let mut encoder = image::codecs::gif::GifEncoder::new(out);
    encoder
        .set_repeat(image::codecs::gif::Repeat::Infinite)
        .context("set gif repeat")?;
    encoder.encode_frames(frames).context("encode gif frames")?;
    Ok(())
}

/// Write `source` to `path` as a GIF.
pub fn save_animation(source: &FrameSource, path: impl AsRef<Path>) -> LoopmaskResult<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("create animation '{}'", path.display()))?;
    encode_animation(source, BufWriter::new(file))
}

/// Write a mask as a straight-alpha PNG that [`crate::load_mask`] reads back losslessly.
pub fn save_mask(mask: &Raster, path: impl AsRef<Path>) -> LoopmaskResult<()> {
    let path = path.as_ref();
    if mask.is_empty() {
        return Err(LoopmaskError::validation(format!(
            "mask for '{}' is empty",
            path.display()
        )));
    }
    image::save_buffer_with_format(
        path,
        &straight_rgba8(mask),
        mask.width(),
        mask.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write mask '{}'", path.display()))?;
    Ok(())
}

fn straight_rgba8(raster: &Raster) -> Vec<u8> {
    let mut out = raster.as_bytes().to_vec();
    unpremultiply_rgba8_in_place(&mut out);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/encode.rs"]
mod tests;
