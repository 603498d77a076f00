use std::fmt::Display;

use thiserror::Error;

use crate::{tensor::InputTensor, PixelRegion, Rect};

#[derive(Error, Debug)]
pub enum RedactError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Inference failure: {0}")]
    InferenceFailure(String),
    #[error("Degenerate face box: {0}")]
    DegenerateBox(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Encode error: {0}")]
    EncodeError(String),
    #[error("Other error: {0}")]
    Other(String),
}

impl From<std::io::Error> for RedactError {
    fn from(err: std::io::Error) -> Self {
        RedactError::IoError(err)
    }
}

pub type RedactResult<R> = Result<R, RedactError>;

/// Classes emitted by the YOLOX body/head/hand/face detector.
///
/// Which id covers the face region depends on the model revision; the bundled
/// revision redacts id 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPartClass {
    Body = 0,
    Head = 1,
    Hand = 2,
    Face = 3,
}

impl BodyPartClass {
    /// Maps a raw class id onto a class, if it is a known one.
    pub fn from_id(class_id: f32) -> Option<Self> {
        if !class_id.is_finite() || class_id.fract() != 0.0 {
            return None;
        }
        match class_id as i64 {
            0 => Some(Self::Body),
            1 => Some(Self::Head),
            2 => Some(Self::Hand),
            3 => Some(Self::Face),
            _ => None,
        }
    }

    pub fn id(self) -> u32 {
        self as u32
    }
}

/// Number of values in one raw detection record.
pub const RAW_DETECTION_LEN: usize = 7;

/// One record of the detector output: `[batch_index, class_id, score, x1, y1, x2, y2]`,
/// with corners in model input coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub batch_index: f32,
    pub class_id: f32,
    pub score: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl RawDetection {
    /// Reads a record from the first seven values of `values`.
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        match values {
            [batch_index, class_id, score, x1, y1, x2, y2, ..] => Some(Self {
                batch_index: *batch_index,
                class_id: *class_id,
                score: *score,
                x1: *x1,
                y1: *y1,
                x2: *x2,
                y2: *y2,
            }),
            _ => None,
        }
    }
}

/// Face bounding box in original image pixel coordinates.
///
/// The detector does not promise `x1 <= x2` or `y1 <= y2`; use
/// [`FaceBox::pixel_region`] to get a validated rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
}

impl FaceBox {
    pub fn rect(&self) -> Rect {
        Rect::at(self.x1, self.y1).ending_at(self.x2, self.y2)
    }

    /// Clamps the box into a `width` x `height` image.
    ///
    /// Fails with [`RedactError::DegenerateBox`] if the box is inverted, not finite,
    /// or has no area left after clamping.
    pub fn pixel_region(&self, width: u32, height: u32) -> RedactResult<PixelRegion> {
        self.rect()
            .to_pixel_region(width, height)
            .ok_or_else(|| RedactError::DegenerateBox(format!("{} in {}x{}", self, width, height)))
    }
}

impl Display for FaceBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{x1: {}, y1: {}, x2: {}, y2: {}, score: {}}}",
            self.x1, self.y1, self.x2, self.y2, self.score
        )
    }
}

/// Inference engine consuming one input tensor and producing the flat
/// `[num_boxes, 7]` detection array.
pub trait Detector: Send + Sync {
    fn run(&self, input: InputTensor) -> RedactResult<Vec<f32>>;

    /// Input resolution `(width, height)` the model was exported with, if known.
    fn input_size(&self) -> Option<(u32, u32)> {
        None
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DetectionParams {
    pub score_threshold: f32,
    /// Raw class id that gets redacted. Specific to the model revision.
    pub target_class_id: u32,
    pub record_stride: usize,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            score_threshold: 0.35,
            target_class_id: BodyPartClass::Head.id(),
            record_stride: RAW_DETECTION_LEN,
        }
    }
}
