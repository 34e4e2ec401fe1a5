//! Benchmarks for frame differencing and the full analysis pipeline.
//!
//! Run with: cargo bench
//! Run with all features: cargo bench --all-features
//!
//! Frames are synthesized in memory at the default analysis resolution, so
//! no fixture files are needed.

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput};
use judder::{
    AnalysisOptions, DEFAULT_ANALYSIS_HEIGHT, DEFAULT_ANALYSIS_WIDTH, Frame, FrameDifferencer,
    JudderError,
};

/// A horizontally scrolling gradient; `content` selects the scroll offset.
fn gradient(content: u64, index: u64) -> Frame {
    let (width, height) = (DEFAULT_ANALYSIS_WIDTH, DEFAULT_ANALYSIS_HEIGHT);
    let luma = (0..height as u64)
        .flat_map(|_| (0..width as u64).map(move |x| ((x + content * 4) % 256) as u8))
        .collect();
    Frame::from_luma(width, height, luma, Duration::from_micros(index * 16_667))
}

/// `count` frames of motion with a short freeze every 60 frames.
fn recording(count: u64) -> Vec<Frame> {
    let mut content = 0;
    (0..count)
        .map(|index| {
            if index % 60 < 55 {
                content += 1;
            }
            gradient(content, index)
        })
        .collect()
}

fn benchmark_difference(criterion: &mut Criterion) {
    let previous = gradient(0, 0);
    let current = gradient(1, 1);

    let mut group = criterion.benchmark_group("difference");
    group.throughput(Throughput::Bytes(previous.luma().len() as u64));
    for tolerance in [0u8, 4] {
        let differencer = FrameDifferencer::new(tolerance);
        group.bench_with_input(
            BenchmarkId::new("pixel_tolerance", tolerance),
            &differencer,
            |bencher, differencer| {
                bencher.iter(|| differencer.difference(&previous, &current, 1).unwrap());
            },
        );
    }
    group.finish();
}

fn benchmark_analysis(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("analyze");
    for count in [300u64, 1_800] {
        let frames = recording(count);
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::from_parameter(count), &frames, |bencher, frames| {
            bencher.iter(|| {
                judder::analyze(frames.iter().cloned().map(Ok::<_, JudderError>)).unwrap()
            });
        });
    }
    group.finish();
}

fn benchmark_report_rendering(criterion: &mut Criterion) {
    let options = AnalysisOptions::new();
    let report = judder::analyze_with_options(
        recording(1_800).into_iter().map(Ok::<_, JudderError>),
        &options,
    )
    .unwrap();

    criterion.bench_function("render json report", |bencher| {
        bencher.iter(|| report.to_json());
    });
    criterion.bench_function("render text report", |bencher| {
        bencher.iter(|| report.to_string());
    });
}

#[cfg(feature = "rayon")]
fn benchmark_batch(criterion: &mut Criterion) {
    let frames = recording(600);
    criterion.bench_function("analyze_batch 4 recordings", |bencher| {
        bencher.iter(|| {
            let sources: Vec<_> = (0..4)
                .map(|_| {
                    let frames = frames.clone();
                    move || Ok::<_, JudderError>(frames.into_iter().map(Ok))
                })
                .collect();
            judder::analyze_batch(sources, &AnalysisOptions::new())
        });
    });
}

#[cfg(not(feature = "rayon"))]
fn benchmark_batch(_criterion: &mut Criterion) {}

criterion::criterion_group!(
    benches,
    benchmark_difference,
    benchmark_analysis,
    benchmark_report_rendering,
    benchmark_batch,
);
criterion::criterion_main!(benches);
