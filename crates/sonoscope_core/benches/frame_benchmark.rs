//! Performance benchmarks for frame conversion
//!
//! Run with: cargo bench -p sonoscope_core

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sonoscope_core::Frame;

fn benchmark_capture_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");

    // Frame sizes the pipeline typically runs at
    let frame_sizes = [256, 512, 1024, 2048, 4096];

    for size in frame_sizes {
        group.throughput(Throughput::Bytes((size * 2) as u64));

        group.bench_function(format!("fill_from_capture_{}_samples", size), |b| {
            let bytes: Vec<u8> = (0..size * 2).map(|i| (i % 251) as u8).collect();
            let mut frame = Frame::new(size);

            b.iter(|| {
                frame.fill_from_capture(black_box(&bytes)).unwrap();
            });
        });

        group.bench_function(format!("encode_playback_{}_samples", size), |b| {
            let mut frame = Frame::new(size);
            for i in 0..size {
                frame.set_sample(i, ((i as f64) * 0.01).sin());
            }
            let mut out = vec![0u8; size * 2];

            b.iter(|| {
                frame.encode_playback(black_box(&mut out)).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_capture_decode);

criterion_main!(benches);
