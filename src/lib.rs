mod rect;
pub use rect::{PixelRegion, Rect};

mod detection;
pub use detection::{
    BodyPartClass, DetectionParams, Detector, FaceBox, RawDetection, RedactError, RedactResult,
    RAW_DETECTION_LEN,
};

mod ort;

mod imaging;
pub use imaging::{
    anonymized_file_name, decode_image, encode_image, pixel_buffer_from_raw, resize_exact,
    OutputFormat, PixelBuffer, RESIZE_FILTER,
};

mod tensor;
pub use tensor::{encode, ChannelOrder, InputTensor, YOLOX_CHANNEL_ORDER};

mod decoder;
pub use decoder::decode_detections;

mod kernel;
pub use kernel::{Kernel, KERNEL_SIZE};

mod redact;
pub use redact::{blur_region, convolve_renormalized, redact, BlurParams};

#[cfg(test)]
pub mod testing;

mod yolox;
pub use yolox::YoloxDetector;

mod builder;
pub use builder::{FaceModel, FaceRedactorBuilder, InferParams, Provider};

mod pipeline;
pub use pipeline::{FaceRedactor, RedactionConfig};

#[cfg(feature = "viz")]
pub mod viz;

mod model_repository;
pub use model_repository::{HttpRepository, ModelRepository};
