//! Benchmarks for per-frame mapping evaluation.
//!
//! Run with: cargo bench -p roomlens-core

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use roomlens_core::demo::{demo_frame, DemoFrames};
use roomlens_core::transform::TransformCache;
use roomlens_core::{AxisMapper, Frame, MappingPipeline, MappingSpec, TransformCall};

const MAPPING: &str = r#"{
    "sensors": {
        "mic": {"enabled": true, "features": {
            "rms": {"transform": "log10_clamp(floor_db=-60)", "map_to": {"axis": "grain_density", "range": [0.1, 0.9]}},
            "spectral_centroid": {"map_to": {"axis": "filter_cutoff_hz", "range": [400, 8000]}}
        }},
        "tof": {"enabled": true, "features": {
            "motion_energy": {"transform": "softclip(threshold=0.6, slope=3)", "map_to": {"axis": "granular_jitter"}},
            "proximity": {"map_to": {"axis": "delay_time_ms", "range": [40, 240]}}
        }},
        "light": {"enabled": true, "features": {
            "lux": {"map_to": {"axis": "reverb_mix", "range": [0.05, 0.6]}},
            "flicker_hz": {"transform": "inverse_exp(centers=[0.3, 0.7], k=1.5)", "map_to": {"axis": "tremolo_depth"}}
        }},
        "motion": {"enabled": true, "features": {
            "burst": {"map_to": {"axis": "freeze"}}
        }}
    }
}"#;

fn spec() -> MappingSpec {
    MappingSpec::from_json_str(MAPPING).expect("bench mapping parses")
}

fn bench_apply(c: &mut Criterion) {
    let spec = spec();
    let mapper = AxisMapper::new().with_cache(Arc::new(TransformCache::new()));
    mapper.prepare(&spec).expect("bench mapping prepares");
    let frame = demo_frame(4.2);

    let mut group = c.benchmark_group("apply");
    group.throughput(Throughput::Elements(1));
    group.bench_function("warm_cache", |b| {
        b.iter(|| mapper.apply(black_box(&frame), black_box(&spec)))
    });
    group.bench_function("empty_frame", |b| {
        let empty = Frame::new();
        b.iter(|| mapper.apply(black_box(&empty), black_box(&spec)))
    });
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let pipeline = MappingPipeline::new(spec()).expect("bench mapping loads");
    let frames: Vec<Frame> = DemoFrames::at_rate(60.0).take(600).collect();

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(frames.len() as u64));
    group.bench_function("ten_seconds_at_60hz", |b| {
        b.iter(|| {
            frames
                .iter()
                .filter_map(|frame| pipeline.process_frame(black_box(frame)).ok())
                .count()
        })
    });
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_transform", |b| {
        b.iter(|| TransformCall::parse(black_box("inverse_exp(centers=[50, 120], k=1.2)")))
    });
}

criterion_group!(benches, bench_apply, bench_pipeline, bench_parse);
criterion_main!(benches);
