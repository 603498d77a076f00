use image::imageops;
use itertools::iproduct;
use tracing::{debug, warn};

use crate::{
    detection::FaceBox,
    imaging::{resize_exact, PixelBuffer},
    kernel::{Kernel, KERNEL_SIZE},
    PixelRegion,
};

/// Blur parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurParams {
    /// Every face is blurred at this `(width, height)` and scaled back up, so the
    /// amount of blur does not depend on the face size.
    pub working_size: (u32, u32),
    pub kernel: Kernel,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            working_size: (20, 20),
            kernel: Kernel::GAUSSIAN_5X5,
        }
    }
}

/// Convolves the colour channels of `image` with `kernel`.
///
/// Taps falling outside the image are skipped and the sum is divided by the
/// weights actually used, so borders do not darken and a constant image comes
/// out unchanged. Alpha is copied through.
pub fn convolve_renormalized(image: &PixelBuffer, kernel: &Kernel) -> PixelBuffer {
    let (width, height) = image.dimensions();
    let radius = kernel.radius();
    let mut blurred = image.clone();

    for (y, x) in iproduct!(0..height, 0..width) {
        let mut sums = [0u64; 3];
        let mut used_weight = 0u64;

        for (i, j) in iproduct!(0..KERNEL_SIZE, 0..KERNEL_SIZE) {
            let sx = x as i64 + i as i64 - radius;
            let sy = y as i64 + j as i64 - radius;
            if sx < 0 || sy < 0 || sx >= width as i64 || sy >= height as i64 {
                continue;
            }

            let weight = kernel.weight(i, j) as u64;
            let pixel = image.get_pixel(sx as u32, sy as u32);
            for (sum, &value) in sums.iter_mut().zip(pixel.0.iter()) {
                *sum += weight * value as u64;
            }
            used_weight += weight;
        }

        if used_weight == 0 {
            continue;
        }
        let out = blurred.get_pixel_mut(x, y);
        for (channel, sum) in out.0.iter_mut().zip(sums) {
            *channel = ((sum + used_weight / 2) / used_weight) as u8;
        }
    }

    blurred
}

/// Blurs one region of `source` into a patch of the region's size.
pub fn blur_region(source: &PixelBuffer, region: PixelRegion, params: &BlurParams) -> PixelBuffer {
    let (work_width, work_height) = params.working_size;
    let patch =
        imageops::crop_imm(source, region.x, region.y, region.width, region.height).to_image();
    let small = resize_exact(&patch, work_width, work_height);
    let blurred = convolve_renormalized(&small, &params.kernel);
    resize_exact(&blurred, region.width, region.height)
}

/// Blurs every face box of `buffer`.
///
/// Patches are computed from the untouched input before any of them is written
/// back, so a box never re-blurs pixels of another box. Boxes that are
/// inverted, empty or outside the image are logged and skipped.
pub fn redact(mut buffer: PixelBuffer, faces: &[FaceBox], params: &BlurParams) -> PixelBuffer {
    let (width, height) = buffer.dimensions();

    let patches: Vec<(PixelRegion, PixelBuffer)> = faces
        .iter()
        .filter_map(|face| match face.pixel_region(width, height) {
            Ok(region) => Some((region, blur_region(&buffer, region, params))),
            Err(err) => {
                warn!(%err, "Skipping face box");
                None
            }
        })
        .collect();

    debug!(
        faces = faces.len(),
        redacted = patches.len(),
        "Blurred face regions"
    );

    for (region, patch) in patches {
        imageops::replace(&mut buffer, &patch, region.x as i64, region.y as i64);
    }
    buffer
}

#[cfg(test)]
mod tests {
    use image::Rgba;
    use rstest::rstest;

    use super::*;
    use crate::testing::{pattern_image, white_image};

    fn face(x1: f32, y1: f32, x2: f32, y2: f32) -> FaceBox {
        FaceBox {
            x1,
            y1,
            x2,
            y2,
            score: 0.9,
        }
    }

    #[rstest]
    #[case(Rgba([255, 255, 255, 255]))]
    #[case(Rgba([0, 0, 0, 255]))]
    #[case(Rgba([13, 200, 77, 128]))]
    fn constant_field_should_be_fixed_point(#[case] color: Rgba<u8>) {
        let image = PixelBuffer::from_pixel(20, 20, color);
        let blurred = convolve_renormalized(&image, &Kernel::GAUSSIAN_5X5);
        assert!(blurred.pixels().all(|p| *p == color));
    }

    #[test]
    fn should_renormalize_at_corner() {
        let mut image = PixelBuffer::from_pixel(20, 20, Rgba([0, 0, 0, 255]));
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let blurred = convolve_renormalized(&image, &Kernel::GAUSSIAN_5X5);

        // In-bounds taps at the corner: rows/cols 2..5 of the kernel, sum 11 * 11.
        let expected = ((255 * 36 + 121 / 2) / 121) as u8;
        assert_eq!(blurred.get_pixel(0, 0)[0], expected);
        assert_eq!(blurred.get_pixel(0, 0)[1], 0);
        assert_eq!(blurred.get_pixel(5, 5)[0], 0);
    }

    #[rstest]
    #[case::white(Rgba([255, 255, 255, 255]))]
    #[case::grey(Rgba([90, 140, 30, 255]))]
    fn heavy_kernel_should_not_overflow(#[case] color: Rgba<u8>) {
        let mut weights = [[0; KERNEL_SIZE]; KERNEL_SIZE];
        weights[2][2] = 20_000_000;
        let centre_only = Kernel::new(weights).unwrap();
        let saturated = Kernel::new([[u32::MAX; KERNEL_SIZE]; KERNEL_SIZE]).unwrap();

        let image = PixelBuffer::from_pixel(20, 20, color);
        for kernel in [centre_only, saturated] {
            let blurred = convolve_renormalized(&image, &kernel);
            assert!(blurred.pixels().all(|p| *p == color));
        }
    }

    #[test]
    fn should_keep_alpha() {
        let mut image = PixelBuffer::from_pixel(20, 20, Rgba([0, 0, 0, 10]));
        image.put_pixel(10, 10, Rgba([255, 255, 255, 200]));
        let blurred = convolve_renormalized(&image, &Kernel::GAUSSIAN_5X5);
        assert_eq!(blurred.get_pixel(10, 10)[3], 200);
        assert_eq!(blurred.get_pixel(11, 10)[3], 10);
        assert!(blurred.get_pixel(11, 10)[0] > 0);
    }

    #[rstest]
    fn should_only_touch_inside_boxes(pattern_image: PixelBuffer) {
        let faces = [face(4.0, 3.0, 20.0, 15.0), face(30.0, 2.0, 45.0, 30.0)];
        let redacted = redact(pattern_image.clone(), &faces, &BlurParams::default());

        assert_eq!(redacted.dimensions(), pattern_image.dimensions());
        let regions: Vec<PixelRegion> = faces
            .iter()
            .map(|face| face.pixel_region(pattern_image.width(), pattern_image.height()).unwrap())
            .collect();
        for (x, y, pixel) in redacted.enumerate_pixels() {
            if !regions.iter().any(|region| region.contains(x, y)) {
                assert_eq!(pixel, pattern_image.get_pixel(x, y), "pixel ({}, {})", x, y);
            }
        }
        assert_ne!(redacted, pattern_image);
    }

    #[rstest]
    fn white_region_should_stay_white(white_image: PixelBuffer) {
        let redacted = redact(
            white_image.clone(),
            &[face(100.0, 100.0, 200.0, 200.0)],
            &BlurParams::default(),
        );
        assert_eq!(redacted, white_image);
    }

    #[rstest]
    fn should_skip_degenerate_boxes(pattern_image: PixelBuffer) {
        let faces = [
            face(10.0, 10.0, 5.0, 20.0),
            face(-50.0, -50.0, -10.0, -10.0),
            face(f32::NAN, 0.0, 10.0, 10.0),
            face(1000.0, 1000.0, 1200.0, 1200.0),
        ];
        let redacted = redact(pattern_image.clone(), &faces, &BlurParams::default());
        assert_eq!(redacted, pattern_image);
    }

    #[rstest]
    fn should_clamp_boxes_crossing_the_border(pattern_image: PixelBuffer) {
        let (width, height) = pattern_image.dimensions();
        let faces = [face(width as f32 - 10.0, -5.0, width as f32 + 30.0, 12.0)];
        let redacted = redact(pattern_image.clone(), &faces, &BlurParams::default());

        assert_eq!(redacted.dimensions(), (width, height));
        assert_eq!(redacted.get_pixel(0, 0), pattern_image.get_pixel(0, 0));
        assert_eq!(
            redacted.get_pixel(width - 11, 5),
            pattern_image.get_pixel(width - 11, 5)
        );
        assert_eq!(
            redacted.get_pixel(width - 5, 12),
            pattern_image.get_pixel(width - 5, 12)
        );
    }

    #[rstest]
    fn should_blur_from_untouched_source(pattern_image: PixelBuffer) {
        let a = face(5.0, 5.0, 25.0, 25.0);
        let b = face(15.0, 10.0, 40.0, 30.0);
        let params = BlurParams::default();

        let ab = redact(pattern_image.clone(), &[a, b], &params);
        let ba = redact(pattern_image.clone(), &[b, a], &params);

        let standalone_a = blur_region(
            &pattern_image,
            a.pixel_region(pattern_image.width(), pattern_image.height())
                .unwrap(),
            &params,
        );
        // (6, 6) is only covered by `a`.
        assert_eq!(ab.get_pixel(6, 6), standalone_a.get_pixel(1, 1));
        assert_eq!(ba.get_pixel(6, 6), standalone_a.get_pixel(1, 1));
    }
}
