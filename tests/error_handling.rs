//! Error handling tests: degenerate inputs, malformed frames, and invalid
//! configuration.

use std::time::Duration;

use judder::{
    AnalysisOptions, DuplicateDetectionOptions, Frame, JudderError, MotionOptions,
    ScoringOptions, StutterAnalyzer,
};

fn flat(value: u8, index: u64) -> Frame {
    Frame::from_luma(8, 8, vec![value; 64], Duration::from_millis(index * 16))
}

fn frames(list: Vec<Frame>) -> impl Iterator<Item = Result<Frame, JudderError>> {
    list.into_iter().map(Ok)
}

// ── Insufficient data ─────────────────────────────────────────────

#[test]
fn empty_input_is_insufficient_data() {
    let result = judder::analyze(frames(Vec::new()));
    assert!(
        matches!(result, Err(JudderError::InsufficientData { frames: 0 })),
        "expected InsufficientData, got {result:?}"
    );
}

#[test]
fn single_frame_has_no_metrics() {
    let report = judder::analyze(frames(vec![flat(10, 0)])).expect("single frame report");

    assert_eq!(report.total_frames, 1);
    assert!(report.metrics.is_none());
    assert!(report.smoothness_score.is_none());
    assert!(report.stutter_events.is_empty());
    assert!(matches!(
        report.require_metrics(),
        Err(JudderError::InsufficientData { frames: 1 })
    ));
    assert!(matches!(
        report.require_score(),
        Err(JudderError::InsufficientData { frames: 1 })
    ));
}

#[test]
fn identical_timestamps_leave_score_undefined() {
    let list = (0..5)
        .map(|i| Frame::from_luma(8, 8, vec![i as u8 * 30; 64], Duration::ZERO))
        .collect();
    let report = judder::analyze(frames(list)).expect("report");
    let metrics = report.require_metrics().expect("metrics");

    assert_eq!(metrics.valid_intervals, 0);
    assert_eq!(metrics.average_fps, None);
    assert_eq!(report.smoothness_score, None);
}

#[test]
fn insufficient_data_message() {
    let error = JudderError::InsufficientData { frames: 1 };
    assert!(error.to_string().contains("1 frame(s)"));
}

// ── Malformed frames ──────────────────────────────────────────────

#[test]
fn truncated_buffer_is_decode_error() {
    let list = vec![
        flat(0, 0),
        flat(0, 1),
        Frame::from_luma(8, 8, vec![0; 10], Duration::from_millis(32)),
    ];
    let result = judder::analyze(frames(list));
    assert!(
        matches!(result, Err(JudderError::DecodeInput { frame_index: 2, .. })),
        "expected DecodeInput at frame 2, got {result:?}"
    );
}

#[test]
fn zero_sized_frame_is_decode_error() {
    let list = vec![Frame::from_luma(0, 0, Vec::new(), Duration::ZERO)];
    let result = judder::analyze(frames(list));
    assert!(matches!(
        result,
        Err(JudderError::DecodeInput { frame_index: 0, .. })
    ));
}

#[test]
fn resolution_change_is_decode_error() {
    let list = vec![
        flat(0, 0),
        Frame::from_luma(4, 4, vec![0; 16], Duration::from_millis(16)),
    ];
    let result = judder::analyze(frames(list));
    match result {
        Err(JudderError::DecodeInput {
            frame_index,
            reason,
        }) => {
            assert_eq!(frame_index, 1);
            assert!(reason.contains("resolution"), "reason: {reason}");
        }
        other => panic!("expected DecodeInput, got {other:?}"),
    }
}

#[test]
fn backwards_timestamp_is_decode_error() {
    let list = vec![flat(0, 0), flat(10, 5), flat(20, 3)];
    let result = judder::analyze(frames(list));
    assert!(matches!(
        result,
        Err(JudderError::DecodeInput { frame_index: 2, .. })
    ));
}

#[test]
fn source_error_is_tagged_with_frame_index() {
    let source = vec![
        Ok(flat(0, 0)),
        Ok(flat(1, 1)),
        Err(JudderError::IoError(std::io::Error::other("disk vanished"))),
    ];
    let result = judder::analyze(source);
    match result {
        Err(JudderError::DecodeInput {
            frame_index,
            reason,
        }) => {
            assert_eq!(frame_index, 2);
            assert!(reason.contains("disk vanished"), "reason: {reason}");
        }
        other => panic!("expected DecodeInput, got {other:?}"),
    }
}

#[test]
fn rejected_frame_leaves_analyzer_usable() {
    let mut analyzer = StutterAnalyzer::new(&AnalysisOptions::new()).expect("analyzer");
    analyzer.push(flat(0, 0)).expect("first frame");

    let bad = Frame::from_luma(8, 8, vec![0; 3], Duration::from_millis(16));
    assert!(analyzer.push(bad).is_err());
    assert_eq!(analyzer.frames_analyzed(), 1);

    let classification = analyzer.push(flat(0, 1)).expect("second frame");
    assert_eq!(classification.index, 1);
    assert!(classification.is_duplicate);
}

// ── Configuration ─────────────────────────────────────────────────

#[test]
fn invalid_smoothing_factor_is_rejected() {
    let options = AnalysisOptions::new()
        .with_duplicate_detection(DuplicateDetectionOptions::new().smoothing_factor(1.5));
    let result = judder::analyze_with_options(frames(vec![flat(0, 0)]), &options);
    assert!(matches!(
        result,
        Err(JudderError::InvalidConfiguration {
            option: "smoothing_factor",
            ..
        })
    ));
}

#[test]
fn invalid_options_are_rejected_by_name() {
    let cases: Vec<(AnalysisOptions, &str)> = vec![
        (
            AnalysisOptions::new()
                .with_duplicate_detection(DuplicateDetectionOptions::new().smoothing_factor(0.0)),
            "smoothing_factor",
        ),
        (
            AnalysisOptions::new()
                .with_duplicate_detection(DuplicateDetectionOptions::new().scene_cut_threshold(1.0)),
            "scene_cut_threshold",
        ),
        (
            AnalysisOptions::new().with_motion(MotionOptions::new().window(0)),
            "motion window",
        ),
        (
            AnalysisOptions::new().with_scoring(ScoringOptions::new().target_fps(0.0)),
            "target_fps",
        ),
        (
            AnalysisOptions::new().with_gap_threshold(Duration::ZERO),
            "gap_threshold",
        ),
        (
            AnalysisOptions::new().with_analysis_resolution(0, 180),
            "analysis_resolution",
        ),
    ];

    for (options, expected) in cases {
        match StutterAnalyzer::new(&options) {
            Err(JudderError::InvalidConfiguration { option, .. }) => {
                assert_eq!(option, expected);
            }
            Err(other) => panic!("expected InvalidConfiguration for {expected}, got {other:?}"),
            Ok(_) => panic!("expected InvalidConfiguration for {expected}"),
        }
    }
}
