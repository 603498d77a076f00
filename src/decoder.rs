use tracing::{debug, warn};

use crate::detection::{DetectionParams, FaceBox, RawDetection};

/// Turns the flat detector output into face boxes in original image coordinates.
///
/// Records are kept when their score reaches `params.score_threshold` and their
/// class is `params.target_class_id`. Corners are scaled from the
/// `resized_size` the detector saw back to `original_size`, each axis on its own
/// since the encoder stretches without keeping the aspect ratio. Detector order
/// is preserved.
///
/// # Arguments
///
/// * `raw` - Detector output, `record_stride` values per record.
/// * `params` - Detection parameters.
/// * `resized_size` - `(width, height)` of the model input.
/// * `original_size` - `(width, height)` of the source image.
pub fn decode_detections(
    raw: &[f32],
    params: &DetectionParams,
    resized_size: (u32, u32),
    original_size: (u32, u32),
) -> Vec<FaceBox> {
    let stride = params.record_stride;
    if stride == 0 || raw.is_empty() {
        return Vec::new();
    }

    let chunks = raw.chunks_exact(stride);
    if !chunks.remainder().is_empty() {
        warn!(
            len = raw.len(),
            stride,
            "Detector output has a trailing partial record, ignoring it"
        );
    }

    let x_scale = original_size.0 as f32 / resized_size.0 as f32;
    let y_scale = original_size.1 as f32 / resized_size.1 as f32;
    let target_class = params.target_class_id as f32;

    let faces: Vec<FaceBox> = chunks
        .filter_map(RawDetection::from_slice)
        .filter(|det| det.score >= params.score_threshold && det.class_id == target_class)
        .map(|det| FaceBox {
            x1: det.x1 * x_scale,
            y1: det.y1 * y_scale,
            x2: det.x2 * x_scale,
            y2: det.y2 * y_scale,
            score: det.score,
        })
        .collect();

    debug!(
        candidates = raw.len() / stride,
        faces = faces.len(),
        "Decoded detections"
    );
    faces
}
