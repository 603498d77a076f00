use ort::Error as OrtError;

use crate::detection::RedactError;

impl From<OrtError> for RedactError {
    fn from(err: OrtError) -> Self {
        RedactError::InferenceFailure(err.to_string())
    }
}
