use image::Rgba;
use rstest::fixture;

use crate::imaging::PixelBuffer;

/// 64x48 image whose neighbouring pixels all differ.
#[fixture]
pub fn pattern_image() -> PixelBuffer {
    PixelBuffer::from_fn(64, 48, |x, y| {
        Rgba([
            ((x * 37 + y * 11) % 256) as u8,
            ((x * 5 + y * 53) % 256) as u8,
            ((x * y * 3 + 17) % 256) as u8,
            255,
        ])
    })
}

/// Opaque white 960x480 image, the size of the detector input.
#[fixture]
pub fn white_image() -> PixelBuffer {
    PixelBuffer::from_pixel(960, 480, Rgba([255, 255, 255, 255]))
}
