//! Frame timing analysis: constant vs variable frame rate.

use std::time::Duration;

use judder::{Frame, FrameTimingAnalysis, JudderError};

#[test]
fn constant_intervals_are_not_vfr() {
    let intervals = vec![Duration::from_micros(33_333); 90];
    let timing = FrameTimingAnalysis::from_frame_times(&intervals);

    assert!(!timing.is_vfr, "constant intervals should not be VFR");
    assert_eq!(timing.intervals_analyzed, 90);
    assert!((timing.mean_fps - 30.0).abs() < 0.01);
    assert!((timing.min_fps - timing.max_fps).abs() < 1e-9);
    assert!(timing.frame_duration_stddev < 1e-9);
}

#[test]
fn alternating_intervals_are_vfr() {
    let intervals: Vec<Duration> = (0..100)
        .map(|i| Duration::from_millis(if i % 2 == 0 { 10 } else { 30 }))
        .collect();
    let timing = FrameTimingAnalysis::from_frame_times(&intervals);

    assert!(timing.is_vfr, "10/30 ms alternation should be VFR");
    assert!((timing.max_fps - 100.0).abs() < 1e-6);
    assert!((timing.min_fps - 1000.0 / 30.0).abs() < 1e-6);
    assert!(timing.min_fps <= timing.mean_fps && timing.mean_fps <= timing.max_fps);
}

#[test]
fn empty_intervals_yield_zeroes() {
    let timing = FrameTimingAnalysis::from_frame_times(&[]);

    assert!(!timing.is_vfr);
    assert_eq!(timing.intervals_analyzed, 0);
    assert_eq!(timing.mean_fps, 0.0);
}

#[test]
fn report_timing_covers_valid_intervals() {
    let timestamps = [0u64, 10, 40, 50, 80, 90, 2_000];
    let frames = timestamps.iter().enumerate().map(|(index, &ms)| {
        Ok::<_, JudderError>(Frame::from_luma(
            4,
            4,
            vec![(index * 50) as u8; 16],
            Duration::from_millis(ms),
        ))
    });
    let report = judder::analyze(frames).expect("report");

    // The 1910 ms gap is a discontinuity and left out.
    assert_eq!(report.timing.intervals_analyzed, 5);
    assert!(report.timing.is_vfr);
}
