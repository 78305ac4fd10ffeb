use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use image::AnimationDecoder;

use crate::{
    assets::frames::{Frame, FrameSource, Raster},
    foundation::error::{LoopmaskError, LoopmaskResult},
    foundation::math::premultiply_rgba8_in_place,
};

/// Decode animation bytes into a [`FrameSource`].
///
/// GIFs keep every frame with its delay converted to hundredths of a second. Any other raster
/// format the `image` crate understands becomes a single frame with an unspecified duration.
pub fn decode_animation(bytes: &[u8]) -> LoopmaskResult<FrameSource> {
    let format = image::guess_format(bytes).context("guess animation format")?;
    if format != image::ImageFormat::Gif {
        let raster = decode_raster(bytes)?;
        return Ok(FrameSource::still(raster));
    }

    let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(bytes))
        .context("open gif decoder")?;
    let decoded = decoder
        .into_frames()
        .collect_frames()
        .context("decode gif frames")?;
    if decoded.is_empty() {
        return Err(LoopmaskError::decode("gif contains no frames"));
    }

    let mut width = 0;
    let mut height = 0;
    let mut frames = Vec::with_capacity(decoded.len());
    for frame in decoded {
        let duration = delay_to_duration(frame.delay());
        let rgba = frame.into_buffer();
        let (w, h) = rgba.dimensions();
        width = width.max(w);
        height = height.max(h);

        let mut pixels = rgba.into_raw();
        premultiply_rgba8_in_place(&mut pixels);
        frames.push(Frame {
            raster: Raster::new(w, h, pixels)?,
            duration,
        });
    }

    Ok(FrameSource::new(width, height, frames))
}

/// Decode any raster into a premultiplied mask. Only the alpha footprint matters when masking.
pub fn decode_mask(bytes: &[u8]) -> LoopmaskResult<Raster> {
    decode_raster(bytes)
}

/// Read and decode an animation file.
pub fn load_animation(path: impl AsRef<Path>) -> LoopmaskResult<FrameSource> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("read animation '{}'", path.display()))?;
    decode_animation(&bytes).map_err(|e| with_path(e, path))
}

/// Read and decode a mask image file.
pub fn load_mask(path: impl AsRef<Path>) -> LoopmaskResult<Raster> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("read mask '{}'", path.display()))?;
    decode_mask(&bytes).map_err(|e| with_path(e, path))
}

fn decode_raster(bytes: &[u8]) -> LoopmaskResult<Raster> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut pixels = rgba.into_raw();
    premultiply_rgba8_in_place(&mut pixels);
    Raster::new(width, height, pixels)
}

/// GIF delays are stored in hundredths of a second; `image` reports them as a ms ratio.
fn delay_to_duration(delay: image::Delay) -> u32 {
    let (numer, denom) = delay.numer_denom_ms();
    if denom == 0 {
        return 0;
    }
    let ms = f64::from(numer) / f64::from(denom);
    (ms / 10.0).round() as u32
}

fn with_path(err: LoopmaskError, path: &Path) -> LoopmaskError {
    match err {
        LoopmaskError::Other(e) => {
            LoopmaskError::Other(e.context(format!("decode '{}'", path.display())))
        }
        LoopmaskError::Decode(msg) => {
            LoopmaskError::decode(format!("{msg} ('{}')", path.display()))
        }
        other => other,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
