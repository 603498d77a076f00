//! Blurs the faces of one photograph.
//!
//! ```text
//! cargo run --example redact -- <model.onnx> <input image> [output dir]
//! ```

use std::path::{Path, PathBuf};

use face_redact::{anonymized_file_name, FaceModel, FaceRedactorBuilder, InferParams, Provider};
use tracing_subscriber::EnvFilter;

pub fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(model_path), Some(input_path)) = (args.next(), args.next()) else {
        eprintln!("usage: redact <model.onnx> <input image> [output dir]");
        std::process::exit(2);
    };
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| "tests/output".to_string()));

    let redactor = FaceRedactorBuilder::new(FaceModel::default())
        .from_file(model_path)
        .infer_params(InferParams {
            provider: Provider::OrtCpu,
            intra_threads: Some(4),
            ..Default::default()
        })
        .build()
        .expect("Fail to load the face detector.");

    let source = std::fs::read(&input_path).expect("Can't read input image.");
    let redacted = redactor
        .redact_faces(&source)
        .expect("Can't redact input image.");

    let file_name = Path::new(&input_path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image");
    std::fs::create_dir_all(&output_dir).expect("Can't create output dir.");
    let output_path = output_dir.join(anonymized_file_name(
        file_name,
        redactor.config().output_format,
    ));
    std::fs::write(&output_path, redacted).expect("Can't save output image.");
    tracing::info!(output = %output_path.display(), "Saved redacted image");
}
