//! AnalysisOptions and per-stage option builders.

use std::time::Duration;

use judder::{
    AnalysisOptions, CancellationToken, DEFAULT_ANALYSIS_HEIGHT, DEFAULT_ANALYSIS_WIDTH,
    DuplicateDetectionOptions, Frame, JudderError, MotionOptions, ScoringOptions,
};

// ── Defaults ──────────────────────────────────────────────────────

#[test]
fn analysis_options_defaults() {
    let options = AnalysisOptions::new();

    assert_eq!(options.gap_threshold(), Duration::from_millis(500));
    assert_eq!(
        options.analysis_resolution(),
        (DEFAULT_ANALYSIS_WIDTH, DEFAULT_ANALYSIS_HEIGHT)
    );
    assert_eq!(options.duplicate_detection(), &DuplicateDetectionOptions::default());
    assert_eq!(options.motion(), &MotionOptions::default());
    assert_eq!(options.scoring(), &ScoringOptions::default());
    assert!(options.validate().is_ok());
}

#[test]
fn stage_defaults() {
    let duplicate = DuplicateDetectionOptions::new();
    assert_eq!(duplicate.smoothing_factor, 0.1);
    assert_eq!(duplicate.sensitivity, 1.5);
    assert_eq!(duplicate.ceiling, 3.0);
    assert_eq!(duplicate.initial_noise_floor, 0.5);

    let motion = MotionOptions::new();
    assert_eq!(motion.window, 5);
    assert_eq!(motion.activity_floor, 2.0);
    assert_eq!(motion.noise_margin, 2.0);
    assert_eq!(motion.max_hold_frames, 30);

    let scoring = ScoringOptions::new();
    assert_eq!(scoring.stutter_weight, 200.0);
    assert_eq!(scoring.pacing_weight, 25.0);
    assert_eq!(scoring.target_fps, 30.0);
}

#[test]
fn debug_hides_callbacks() {
    let options = AnalysisOptions::new();
    let debug = format!("{options:?}");
    assert!(debug.contains("AnalysisOptions"));
    assert!(debug.contains("has_cancellation: false"));
    assert!(debug.contains("batch_size: 1"));

    let options = options.with_cancellation(CancellationToken::new());
    assert!(format!("{options:?}").contains("has_cancellation: true"));
}

// ── Builders ──────────────────────────────────────────────────────

#[test]
fn with_batch_size_clamps_zero() {
    let options = AnalysisOptions::new().with_batch_size(0);
    assert!(format!("{options:?}").contains("batch_size: 1"));
}

#[test]
fn builders_replace_stage_options() {
    let options = AnalysisOptions::new()
        .with_duplicate_detection(
            DuplicateDetectionOptions::new()
                .smoothing_factor(0.2)
                .sensitivity(2.0)
                .ceiling(3.0)
                .scene_cut_threshold(50.0)
                .initial_noise_floor(1.0),
        )
        .with_motion(
            MotionOptions::new()
                .window(9)
                .activity_floor(4.0)
                .noise_margin(3.0)
                .max_hold_frames(10),
        )
        .with_scoring(ScoringOptions::new().stutter_weight(100.0).pacing_weight(10.0))
        .with_gap_threshold(Duration::from_millis(100))
        .with_analysis_resolution(160, 90);

    assert_eq!(options.duplicate_detection().smoothing_factor, 0.2);
    assert_eq!(options.duplicate_detection().initial_noise_floor, 1.0);
    assert_eq!(options.motion().window, 9);
    assert_eq!(options.motion().noise_margin, 3.0);
    assert_eq!(options.motion().max_hold_frames, 10);
    assert_eq!(options.scoring().stutter_weight, 100.0);
    assert_eq!(options.gap_threshold(), Duration::from_millis(100));
    assert_eq!(options.analysis_resolution(), (160, 90));
    assert!(options.validate().is_ok());
}

// ── Options change results ────────────────────────────────────────

fn noisy_static_scene() -> Vec<Result<Frame, JudderError>> {
    // A still picture with +-1 luma flicker on every other frame.
    (0..20u64)
        .map(|index| {
            let value = if index % 2 == 0 { 100 } else { 101 };
            Ok(Frame::from_luma(
                8,
                8,
                vec![value; 64],
                Duration::from_millis(index * 16),
            ))
        })
        .collect()
}

#[test]
fn pixel_tolerance_absorbs_flicker() {
    let strict = judder::analyze(noisy_static_scene()).expect("report");
    let tolerant = judder::analyze_with_options(
        noisy_static_scene(),
        &AnalysisOptions::new().with_pixel_tolerance(1),
    )
    .expect("report");

    assert_eq!(tolerant.require_metrics().expect("metrics").duplicate_frames, 19);
    assert!(
        strict.require_metrics().expect("metrics").duplicate_frames
            < tolerant.require_metrics().expect("metrics").duplicate_frames
    );
}

#[test]
fn negative_noise_margin_is_rejected() {
    let options = AnalysisOptions::new().with_motion(MotionOptions::new().noise_margin(-1.0));
    assert!(matches!(
        options.validate(),
        Err(JudderError::InvalidConfiguration {
            option: "noise_margin",
            ..
        })
    ));
}

#[test]
fn gap_threshold_controls_discontinuities() {
    let list = || {
        [0u64, 100, 200, 300]
            .into_iter()
            .map(|ms| Ok(Frame::from_luma(4, 4, vec![0; 16], Duration::from_millis(ms))))
            .collect::<Vec<Result<Frame, JudderError>>>()
    };

    let default = judder::analyze(list()).expect("report");
    assert_eq!(default.require_metrics().expect("metrics").discontinuities, 0);

    let tight = judder::analyze_with_options(
        list(),
        &AnalysisOptions::new().with_gap_threshold(Duration::from_millis(50)),
    )
    .expect("report");
    assert_eq!(tight.require_metrics().expect("metrics").discontinuities, 3);
}
