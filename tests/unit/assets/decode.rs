use std::io::Cursor;

use super::*;

fn encode_gif(frames: &[([u8; 4], u32)]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut encoder = image::codecs::gif::GifEncoder::new(&mut buf);
        let frames = frames.iter().map(|&(px, delay_ms)| {
            let img = image::RgbaImage::from_pixel(3, 2, image::Rgba(px));
            image::Frame::from_parts(img, 0, 0, image::Delay::from_numer_denom_ms(delay_ms, 1))
        });
        encoder.encode_frames(frames).unwrap();
    }
    buf
}

fn encode_png(px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(1, 1, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_gif_keeps_frames_and_delays() {
    let bytes = encode_gif(&[([255, 0, 0, 255], 100), ([0, 0, 255, 255], 40)]);
    let src = decode_animation(&bytes).unwrap();

    assert_eq!(src.frame_count(), 2);
    assert_eq!((src.width(), src.height()), (3, 2));
    assert_eq!(src.frame(0).unwrap().duration, 10);
    assert_eq!(src.frame(1).unwrap().duration, 4);
    assert_eq!(src.frame(0).unwrap().raster.pixel(0, 0).unwrap()[3], 255);
}

#[test]
fn decode_png_is_a_single_still_frame() {
    let src = decode_animation(&encode_png([100, 50, 200, 128])).unwrap();
    assert_eq!(src.frame_count(), 1);
    assert_eq!(src.frame(0).unwrap().duration, 0);
    assert_eq!(
        src.frame(0).unwrap().raster.pixel(0, 0).unwrap(),
        [
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_mask_keeps_alpha_footprint() {
    let mask = decode_mask(&encode_png([0, 0, 0, 0])).unwrap();
    assert_eq!(mask.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn garbage_bytes_fail_to_decode() {
    assert!(decode_animation(b"not an image").is_err());
    assert!(decode_mask(b"GIF89a").is_err());
}

#[test]
fn delay_conversion_rounds_to_hundredths() {
    assert_eq!(delay_to_duration(image::Delay::from_numer_denom_ms(0, 1)), 0);
    assert_eq!(delay_to_duration(image::Delay::from_numer_denom_ms(70, 1)), 7);
    assert_eq!(delay_to_duration(image::Delay::from_numer_denom_ms(1000, 3)), 33);
}

#[test]
fn missing_file_error_names_the_path() {
    let err = load_animation("does/not/exist.gif").unwrap_err();
    assert!(format!("{err:#}").contains("does/not/exist.gif"));
}
