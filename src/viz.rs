use image::{GenericImage, GenericImageView, Rgba};

use crate::{FaceBox, PixelRegion};

impl From<PixelRegion> for imageproc::rect::Rect {
    fn from(region: PixelRegion) -> Self {
        imageproc::rect::Rect::at(region.x as i32, region.y as i32)
            .of_size(region.width, region.height)
    }
}

/// Outlines face boxes in red, for checking detections before blurring.
pub fn draw_face_boxes<I>(image: &mut I, faces: &[FaceBox])
where
    I: GenericImage<Pixel = Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    for face in faces {
        if let Ok(region) = face.pixel_region(width, height) {
            imageproc::drawing::draw_hollow_rect_mut(image, region.into(), Rgba([255, 0, 0, 255]));
        }
    }
}
