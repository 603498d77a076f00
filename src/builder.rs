use std::path::PathBuf;

use crate::{
    detection::{DetectionParams, RedactResult},
    model_repository::{HttpRepository, ModelRepository},
    pipeline::{FaceRedactor, RedactionConfig},
    tensor::{ChannelOrder, YOLOX_CHANNEL_ORDER},
    BlurParams, OutputFormat, YoloxDetector,
};

/// Supported detection models.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FaceModel {
    /// YOLOX-T body/head/hand/face, 480x960 input, NMS included.
    #[default]
    YoloxBodyHeadHandFace480x960,
}

impl FaceModel {
    pub fn file_name(&self) -> &'static str {
        match self {
            FaceModel::YoloxBodyHeadHandFace480x960 => {
                "yolox_t_body_head_hand_face_0299_0.4265_post_1x3x480x960.onnx"
            }
        }
    }

    /// Model input `(width, height)`.
    pub fn input_size(&self) -> (u32, u32) {
        match self {
            FaceModel::YoloxBodyHeadHandFace480x960 => (960, 480),
        }
    }

    pub fn output_name(&self) -> &'static str {
        match self {
            FaceModel::YoloxBodyHeadHandFace480x960 => "batchno_classid_score_x1y1x2y2",
        }
    }

    pub fn channel_order(&self) -> ChannelOrder {
        YOLOX_CHANNEL_ORDER
    }

    /// Threshold and class id tuned for this model revision.
    pub fn detection_params(&self) -> DetectionParams {
        match self {
            FaceModel::YoloxBodyHeadHandFace480x960 => DetectionParams {
                score_threshold: 0.35,
                target_class_id: 1,
                ..Default::default()
            },
        }
    }
}

#[derive(Clone, Debug)]
enum OpenMode {
    File(PathBuf),
    Download(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    /// Uses the, default, CPU inference
    OrtCpu,
    /// Uses the Cuda inference on the given device. May not be available depending of your Onnx runtime installation.
    OrtCuda(i32),
    /// Uses Intel's OpenVINO inference. May not be available depending of your Onnx runtime installation.
    OrtVino,
}

/// Inference parameters.
#[derive(Clone, Debug)]
pub struct InferParams {
    /// Chooses the ONNX runtime provider.
    pub provider: Provider,
    /// Sets the number of intra-op threads.
    pub intra_threads: Option<usize>,
    /// Sets the number of inter-op threads.
    pub inter_threads: Option<usize>,
}

impl Default for InferParams {
    fn default() -> Self {
        Self {
            provider: Provider::OrtCpu,
            intra_threads: None,
            inter_threads: None,
        }
    }
}

/// Builder for loading or downloading a model and creating a [`FaceRedactor`].
pub struct FaceRedactorBuilder {
    model: FaceModel,
    open_mode: OpenMode,
    config: RedactionConfig,
    infer_params: InferParams,
}

impl FaceRedactorBuilder {
    /// Create a new builder for the given model.
    ///
    /// By default the model is loaded from its file name in the working directory.
    ///
    /// # Arguments
    ///
    /// * `model` - The detection model to build.
    pub fn new(model: FaceModel) -> Self {
        Self {
            model,
            open_mode: OpenMode::File(PathBuf::from(model.file_name())),
            config: RedactionConfig::for_model(model),
            infer_params: InferParams::default(),
        }
    }

    /// Load the model from the given file path.
    pub fn from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.open_mode = OpenMode::File(path.into());
        self
    }

    /// Download the model from `url` into the local model cache, unless it is already there.
    pub fn download(mut self, url: impl Into<String>) -> Self {
        self.open_mode = OpenMode::Download(url.into());
        self
    }

    /// Replace the whole redaction configuration.
    pub fn config(mut self, config: RedactionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the detection parameters.
    pub fn detect_params(mut self, params: DetectionParams) -> Self {
        self.config.detection = params;
        self
    }

    /// Set the blur parameters.
    pub fn blur_params(mut self, params: BlurParams) -> Self {
        self.config.blur = params;
        self
    }

    /// Set the format of the redacted image.
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// Sets the inference parameters.
    pub fn infer_params(mut self, params: InferParams) -> Self {
        self.infer_params = params;
        self
    }

    /// Builds a new redactor.
    pub fn build(&self) -> RedactResult<FaceRedactor> {
        let model_path = match &self.open_mode {
            OpenMode::File(path) => path.clone(),
            OpenMode::Download(url) => HttpRepository::new()?.get_model(self.model, url)?,
        };

        let detector = YoloxDetector::from_file(&model_path, self.model, &self.infer_params)?;
        FaceRedactor::new(Box::new(detector), self.config.clone())
    }
}
