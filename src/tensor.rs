use ndarray::{s, Array4, ArrayView2};

use crate::{
    detection::{RedactError, RedactResult},
    imaging::{resize_exact, PixelBuffer},
};

/// Order of the colour planes in the detector input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

impl ChannelOrder {
    /// Index into an RGBA pixel of the channel that lands in `plane`.
    fn source_channel(self, plane: usize) -> usize {
        match self {
            ChannelOrder::Rgb => plane,
            ChannelOrder::Bgr => 2 - plane,
        }
    }
}

/// YOLOX models are trained on OpenCV-decoded BGR images.
pub const YOLOX_CHANNEL_ORDER: ChannelOrder = ChannelOrder::Bgr;

/// Detector input of shape `[1, 3, height, width]`, raw 0-255 intensities.
#[derive(Debug, Clone)]
pub struct InputTensor {
    data: Array4<f32>,
}

impl InputTensor {
    pub fn shape(&self) -> [usize; 4] {
        let (n, c, h, w) = self.data.dim();
        [n, c, h, w]
    }

    pub fn width(&self) -> usize {
        self.data.dim().3
    }

    pub fn height(&self) -> usize {
        self.data.dim().2
    }

    /// Plane `index` of the single batch entry, as `[height, width]`.
    pub fn plane(&self, index: usize) -> ArrayView2<f32> {
        self.data.slice(s![0, index, .., ..])
    }

    /// Values in plane-major, row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Shape and contiguous values, as handed to the inference engine.
    pub fn into_raw(self) -> (Vec<usize>, Vec<f32>) {
        let shape = self.shape().to_vec();
        let data = if self.data.is_standard_layout() {
            self.data.into_raw_vec()
        } else {
            self.data.iter().copied().collect()
        };
        (shape, data)
    }
}

/// Stretches `buffer` to `target_width` x `target_height` and lays it out as a
/// `[1, 3, H, W]` tensor with planes in `channel_order`. Alpha is dropped.
pub fn encode(
    buffer: &PixelBuffer,
    target_width: u32,
    target_height: u32,
    channel_order: ChannelOrder,
) -> RedactResult<InputTensor> {
    let (width, height) = buffer.dimensions();
    if width == 0 || height == 0 {
        return Err(RedactError::InvalidImage(format!(
            "cannot encode a {}x{} image",
            width, height
        )));
    }
    if target_width == 0 || target_height == 0 {
        return Err(RedactError::InvalidImage(format!(
            "cannot resize to {}x{}",
            target_width, target_height
        )));
    }

    let resized = resize_exact(buffer, target_width, target_height);
    let data = Array4::<f32>::from_shape_fn(
        (1, 3, target_height as usize, target_width as usize),
        |(_, c, y, x)| {
            resized.get_pixel(x as u32, y as u32)[channel_order.source_channel(c)] as f32
        },
    );

    Ok(InputTensor { data })
}
