use std::io::Cursor;

use image::{
    imageops::{self, FilterType},
    DynamicImage, ImageOutputFormat, RgbaImage,
};

use crate::detection::{RedactError, RedactResult};

/// RGBA, 8 bits per channel, row-major.
pub type PixelBuffer = RgbaImage;

/// Bilinear filter shared by every resize of the pipeline.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

impl From<image::ImageError> for RedactError {
    fn from(err: image::ImageError) -> Self {
        RedactError::InvalidImage(err.to_string())
    }
}

/// Builds a pixel buffer from raw interleaved RGBA bytes.
pub fn pixel_buffer_from_raw(width: u32, height: u32, data: Vec<u8>) -> RedactResult<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(RedactError::InvalidImage(format!(
            "image dimensions are zero: {}x{}",
            width, height
        )));
    }

    let expected_len = width as usize * height as usize * 4;
    if data.len() != expected_len {
        return Err(RedactError::InvalidImage(format!(
            "invalid RGBA data length: expected {}, got {}",
            expected_len,
            data.len()
        )));
    }

    PixelBuffer::from_raw(width, height, data)
        .ok_or_else(|| RedactError::InvalidImage("failed to create pixel buffer".to_string()))
}

/// Decodes an encoded image (JPEG, PNG, ...) into RGBA pixels.
pub fn decode_image(bytes: &[u8]) -> RedactResult<PixelBuffer> {
    let image = image::load_from_memory(bytes)?.into_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(RedactError::InvalidImage(
            "image dimensions are zero".to_string(),
        ));
    }
    Ok(image)
}

/// Stretches `buffer` to exactly `width` x `height`.
pub fn resize_exact(buffer: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    if buffer.dimensions() == (width, height) {
        return buffer.clone();
    }
    imageops::resize(buffer, width, height, RESIZE_FILTER)
}

/// Format of the redacted image handed back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JPEG with the given quality (1-100). Alpha is dropped.
    Jpeg { quality: u8 },
    Png,
}

impl Default for OutputFormat {
    fn default() -> Self {
        // Same quality browsers use for canvas JPEG export.
        OutputFormat::Jpeg { quality: 92 }
    }
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg { .. } => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Encodes the redacted pixels.
pub fn encode_image(buffer: PixelBuffer, format: OutputFormat) -> RedactResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let image = DynamicImage::ImageRgba8(buffer);
    let written = match format {
        OutputFormat::Jpeg { quality } => DynamicImage::ImageRgb8(image.to_rgb8()).write_to(
            &mut Cursor::new(&mut bytes),
            ImageOutputFormat::Jpeg(quality.clamp(1, 100)),
        ),
        OutputFormat::Png => image.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png),
    };
    written.map_err(|err| RedactError::EncodeError(err.to_string()))?;
    Ok(bytes)
}

/// Download name for a redacted file: `Photo.HEIC` becomes `photo.heic.anon.jpg`.
pub fn anonymized_file_name(file_name: &str, format: OutputFormat) -> String {
    format!("{}.anon.{}", file_name.to_lowercase(), format.extension())
}

#[cfg(test)]
mod tests {
    use image::{GenericImageView, Rgba};

    use super::*;

    #[test]
    fn should_reject_bad_raw_buffers() {
        assert!(matches!(
            pixel_buffer_from_raw(2, 2, vec![0; 15]),
            Err(RedactError::InvalidImage(_))
        ));
        assert!(matches!(
            pixel_buffer_from_raw(0, 2, vec![]),
            Err(RedactError::InvalidImage(_))
        ));
        let buffer = pixel_buffer_from_raw(2, 2, vec![7; 16]).unwrap();
        assert_eq!(buffer.get_pixel(1, 1), &Rgba([7, 7, 7, 7]));
    }

    #[test]
    fn should_fail_to_decode_garbage() {
        assert!(matches!(
            decode_image(b"definitely not an image"),
            Err(RedactError::InvalidImage(_))
        ));
    }

    #[test]
    fn should_encode_png_losslessly() {
        let mut buffer = PixelBuffer::from_pixel(8, 6, Rgba([10, 20, 30, 255]));
        buffer.put_pixel(3, 2, Rgba([200, 100, 50, 255]));

        let bytes = encode_image(buffer.clone(), OutputFormat::Png).unwrap();
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded, buffer);
    }

    #[test]
    fn should_encode_jpeg() {
        let buffer = PixelBuffer::from_pixel(16, 8, Rgba([255, 255, 255, 255]));
        let bytes = encode_image(buffer, OutputFormat::default()).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (16, 8));
    }

    #[test]
    fn should_name_anonymized_files() {
        assert_eq!(
            anonymized_file_name("IMG_0042.HEIC", OutputFormat::default()),
            "img_0042.heic.anon.jpg"
        );
        assert_eq!(
            anonymized_file_name("beach.png", OutputFormat::Png),
            "beach.png.anon.png"
        );
    }
}
