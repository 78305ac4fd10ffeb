use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

/// Porter-Duff source-over on premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Porter-Duff source-in: keep the source only where the destination has coverage.
///
/// The destination's color is discarded; only its alpha scales the source.
pub fn source_in(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let da = u16::from(dst[3]);
    match da {
        0 => [0; 4],
        255 => src,
        _ => src.map(|c| mul_div255_u8(u16::from(c), da)),
    }
}

/// Porter-Duff destination-out: remove destination coverage wherever the source has any.
pub fn destination_out(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let keep = 255u16 - u16::from(src[3]);
    match keep {
        0 => [0; 4],
        255 => dst,
        _ => dst.map(|c| mul_div255_u8(u16::from(c), keep)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
