use std::{path::Path, sync::Mutex};

use ort::{
    execution_providers::{CUDAExecutionProvider, OpenVINOExecutionProvider},
    session::{builder::GraphOptimizationLevel, Session},
    value::{Tensor, Value},
};
use tracing::{debug, info};

use crate::{
    builder::{FaceModel, InferParams, Provider},
    detection::{Detector, RedactError, RedactResult},
    tensor::InputTensor,
};

fn session_error(context: &str, err: impl std::fmt::Display) -> RedactError {
    RedactError::InferenceFailure(format!("{}: {}", context, err))
}

/// YOLOX body/head/hand/face detector running on ONNX Runtime.
///
/// The model has NMS baked in and emits `[num_boxes, 7]` records
/// `[batch_index, class_id, score, x1, y1, x2, y2]` in input pixel coordinates.
pub struct YoloxDetector {
    session: Mutex<Session>,
    input_size: (u32, u32),
    output_name: String,
}

impl YoloxDetector {
    pub fn from_file(
        model_path: &Path,
        model: FaceModel,
        infer_params: &InferParams,
    ) -> RedactResult<Self> {
        if !model_path.exists() {
            return Err(RedactError::InferenceFailure(format!(
                "Model not found: {}",
                model_path.display()
            )));
        }
        let model_bytes = std::fs::read(model_path)
            .map_err(|err| session_error("Failed to read model file", err))?;

        let detector = Self::from_memory(&model_bytes, model, infer_params)?;
        info!(
            model_path = %model_path.display(),
            input_width = detector.input_size.0,
            input_height = detector.input_size.1,
            "Face detector initialized"
        );
        Ok(detector)
    }

    pub fn from_memory(
        model_bytes: &[u8],
        model: FaceModel,
        infer_params: &InferParams,
    ) -> RedactResult<Self> {
        Ok(Self {
            session: Mutex::new(create_session(model_bytes, infer_params)?),
            input_size: model.input_size(),
            output_name: model.output_name().to_string(),
        })
    }
}

fn create_session(model_bytes: &[u8], infer_params: &InferParams) -> RedactResult<Session> {
    let mut builder = Session::builder()
        .map_err(|err| session_error("Failed to create session builder", err))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|err| session_error("Failed to set optimization level", err))?;

    if let Some(threads) = infer_params.intra_threads {
        builder = builder
            .with_intra_threads(threads)
            .map_err(|err| session_error("Failed to set intra-op threads", err))?;
    }
    if let Some(threads) = infer_params.inter_threads {
        builder = builder
            .with_inter_threads(threads)
            .map_err(|err| session_error("Failed to set inter-op threads", err))?;
    }

    // Unavailable providers fall back to the CPU.
    builder = match infer_params.provider {
        Provider::OrtCpu => builder,
        Provider::OrtCuda(device_id) => builder
            .with_execution_providers([CUDAExecutionProvider::default()
                .with_device_id(device_id)
                .build()])
            .map_err(|err| session_error("Failed to register CUDA provider", err))?,
        Provider::OrtVino => builder
            .with_execution_providers([OpenVINOExecutionProvider::default().build()])
            .map_err(|err| session_error("Failed to register OpenVINO provider", err))?,
    };
    info!(provider = ?infer_params.provider, "Creating ONNX Runtime session");

    builder
        .commit_from_memory(model_bytes)
        .map_err(|err| session_error("Failed to load ONNX model", err))
}

impl Detector for YoloxDetector {
    fn run(&self, input: InputTensor) -> RedactResult<Vec<f32>> {
        let (shape, data) = input.into_raw();
        let input: Value = Tensor::from_array((shape, data.into_boxed_slice()))
            .map(Value::from)
            .map_err(|err| session_error("Failed to create tensor", err))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| RedactError::InferenceFailure("Session lock poisoned".to_string()))?;
        let outputs = session.run(ort::inputs![input])?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            RedactError::InferenceFailure(format!("Missing {} tensor", self.output_name))
        })?;
        let (shape, values) = output.try_extract_tensor::<f32>()?;
        debug!(shape = ?shape, "Detector output");

        Ok(values.to_vec())
    }

    fn input_size(&self) -> Option<(u32, u32)> {
        Some(self.input_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_fail_on_missing_model() {
        let result = YoloxDetector::from_file(
            Path::new("tests/data/does-not-exist.onnx"),
            FaceModel::default(),
            &InferParams::default(),
        );
        assert!(matches!(result, Err(RedactError::InferenceFailure(_))));
    }

    #[test]
    fn should_fail_on_invalid_model_bytes() {
        let result = YoloxDetector::from_memory(
            b"not an onnx graph",
            FaceModel::default(),
            &InferParams::default(),
        );
        assert!(matches!(result, Err(RedactError::InferenceFailure(_))));
    }
}
