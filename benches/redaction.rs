use criterion::{criterion_group, criterion_main, Criterion};
use face_redact::{
    decode_detections, encode, redact, BlurParams, DetectionParams, FaceBox, PixelBuffer,
    YOLOX_CHANNEL_ORDER,
};
use image::Rgba;

fn criterion_benchmark(c: &mut Criterion) {
    let image = PixelBuffer::from_fn(1920, 1080, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    });
    let faces: Vec<FaceBox> = (0..5)
        .map(|i| {
            let x = 100.0 + i as f32 * 300.0;
            FaceBox {
                x1: x,
                y1: 200.0,
                x2: x + 250.0,
                y2: 520.0,
                score: 0.9,
            }
        })
        .collect();

    c.bench_function("encode_tensor_960x480", |b| {
        b.iter(|| encode(&image, 960, 480, YOLOX_CHANNEL_ORDER).unwrap())
    });

    let raw: Vec<f32> = (0..100)
        .flat_map(|i| [0.0, (i % 4) as f32, 0.3 + (i % 7) as f32 * 0.1, 10.0, 10.0, 50.0, 50.0])
        .collect();
    c.bench_function("decode_detections_100", |b| {
        b.iter(|| decode_detections(&raw, &DetectionParams::default(), (960, 480), (1920, 1080)))
    });

    c.bench_function("redact_5_faces_1080p", |b| {
        b.iter(|| redact(image.clone(), &faces, &BlurParams::default()))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
