use std::time::Instant;

use tracing::debug;

use crate::{
    builder::FaceModel,
    decoder::decode_detections,
    detection::{DetectionParams, Detector, FaceBox, RedactError, RedactResult, RAW_DETECTION_LEN},
    imaging::{decode_image, encode_image, OutputFormat, PixelBuffer},
    redact::{redact, BlurParams},
    tensor::{encode, ChannelOrder},
};

/// Everything that tunes a redaction run.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionConfig {
    /// Detector input `(width, height)`.
    pub input_size: (u32, u32),
    pub channel_order: ChannelOrder,
    pub detection: DetectionParams,
    pub blur: BlurParams,
    pub output_format: OutputFormat,
}

impl RedactionConfig {
    /// Defaults matching the metadata of `model`.
    pub fn for_model(model: FaceModel) -> Self {
        Self {
            input_size: model.input_size(),
            channel_order: model.channel_order(),
            detection: model.detection_params(),
            blur: BlurParams::default(),
            output_format: OutputFormat::default(),
        }
    }

    pub fn validate(&self) -> RedactResult<()> {
        let invalid =
            |message: String| -> RedactResult<()> { Err(RedactError::InvalidConfig(message)) };

        let (width, height) = self.input_size;
        if width == 0 || height == 0 {
            return invalid(format!("detector input size is {}x{}", width, height));
        }
        let threshold = self.detection.score_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return invalid(format!("score threshold {} is outside [0, 1]", threshold));
        }
        if self.detection.record_stride < RAW_DETECTION_LEN {
            return invalid(format!(
                "record stride {} is shorter than a detection record",
                self.detection.record_stride
            ));
        }
        let (blur_width, blur_height) = self.blur.working_size;
        if blur_width == 0 || blur_height == 0 {
            return invalid(format!(
                "blur working size is {}x{}",
                blur_width, blur_height
            ));
        }
        if self.blur.kernel.total_weight() == 0 {
            return invalid("kernel weights are all zero".to_string());
        }
        Ok(())
    }
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self::for_model(FaceModel::default())
    }
}

/// Finds faces in photographs and blurs them.
///
/// Holds no per-image state: a single redactor can serve concurrent calls.
pub struct FaceRedactor {
    detector: Box<dyn Detector>,
    config: RedactionConfig,
}

impl FaceRedactor {
    /// Creates a redactor around `detector`.
    ///
    /// Fails with [`RedactError::InvalidConfig`] if the configuration is invalid or
    /// the detector declares an input size other than `config.input_size`.
    pub fn new(detector: Box<dyn Detector>, config: RedactionConfig) -> RedactResult<Self> {
        config.validate()?;
        if let Some(model_size) = detector.input_size() {
            if model_size != config.input_size {
                return Err(RedactError::InvalidConfig(format!(
                    "detector expects {}x{} input, configured for {}x{}",
                    model_size.0, model_size.1, config.input_size.0, config.input_size.1
                )));
            }
        }
        Ok(Self { detector, config })
    }

    pub fn config(&self) -> &RedactionConfig {
        &self.config
    }

    /// Runs the detector on `buffer` and returns the face boxes in its coordinates.
    pub fn detect_faces(&self, buffer: &PixelBuffer) -> RedactResult<Vec<FaceBox>> {
        let (input_width, input_height) = self.config.input_size;

        let started = Instant::now();
        let tensor = encode(buffer, input_width, input_height, self.config.channel_order)?;
        let raw = self.detector.run(tensor)?;
        debug!(
            values = raw.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Inference done"
        );

        Ok(decode_detections(
            &raw,
            &self.config.detection,
            self.config.input_size,
            buffer.dimensions(),
        ))
    }

    /// Blurs every detected face of `buffer`.
    pub fn redact_buffer(&self, buffer: PixelBuffer) -> RedactResult<PixelBuffer> {
        let faces = self.detect_faces(&buffer)?;

        let started = Instant::now();
        let redacted = redact(buffer, &faces, &self.config.blur);
        debug!(
            faces = faces.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Redaction done"
        );
        Ok(redacted)
    }

    /// Decodes `source`, blurs every detected face and encodes the result in the
    /// configured output format.
    pub fn redact_faces(&self, source: &[u8]) -> RedactResult<Vec<u8>> {
        let buffer = decode_image(source)?;
        debug!(
            width = buffer.width(),
            height = buffer.height(),
            "Decoded source image"
        );
        let redacted = self.redact_buffer(buffer)?;
        encode_image(redacted, self.config.output_format)
    }
}
