//! Static encoder and tone level engine benchmarks

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ls_dsp::{StaticEncoder, ToneLevelEngine};

fn bench_encoder_256(c: &mut Criterion) {
    let mut encoder = StaticEncoder::new();
    encoder.set_stereo_color(1.0, 0.5, 0.25, 0.5, 0.25, 0.125);
    encoder.reset(48000.0);

    let mut left = vec![0.0f32; 256];
    let mut right = vec![0.0f32; 256];

    c.bench_function("static_encoder_256", |b| {
        b.iter(|| {
            encoder.process_block(black_box(&mut left), black_box(&mut right), 256, true);
        })
    });
}

fn bench_tone_levels_256(c: &mut Criterion) {
    let mut encoder = StaticEncoder::new();
    encoder.set_stereo_color(0.8, 0.4, 0.2, 0.1, 0.6, 0.9);
    encoder.reset(48000.0);

    let mut left = vec![0.0f32; 256];
    let mut right = vec![0.0f32; 256];
    encoder.process_block(&mut left, &mut right, 256, true);

    let mut engine = ToneLevelEngine::new();
    engine.reset(48000.0, 256);

    c.bench_function("tone_level_engine_256", |b| {
        b.iter(|| {
            engine.process(black_box(&left), black_box(&right), |frame| {
                black_box(frame);
            });
        })
    });
}

criterion_group!(benches, bench_encoder_256, bench_tone_levels_256);
criterion_main!(benches);
