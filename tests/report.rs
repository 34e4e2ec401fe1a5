//! Text and JSON rendering of analysis reports.

use std::time::Duration;

use judder::{AnalysisReport, Frame, JudderError, SmoothnessRating};

fn gradient(content: u64, index: u64) -> Frame {
    let luma = (0..16u64)
        .map(|x| ((x * 16 + content * 8) % 256) as u8)
        .collect();
    Frame::from_luma(16, 1, luma, Duration::from_micros(index * 16_667))
}

fn with_freezes(freezes: &[(u64, u64)]) -> AnalysisReport {
    let mut frames = Vec::new();
    let mut content = 0;
    let mut index = 0;
    for &(moving, frozen) in freezes {
        for _ in 0..moving {
            frames.push(gradient(content, index));
            content += 1;
            index += 1;
        }
        for _ in 0..frozen {
            frames.push(gradient(content - 1, index));
            index += 1;
        }
    }
    judder::analyze(frames.into_iter().map(Ok::<_, JudderError>)).expect("analysis")
}

// ── JSON ──────────────────────────────────────────────────────────

#[test]
fn json_has_stable_keys() {
    let json = with_freezes(&[(40, 10), (50, 0)]).to_json();

    for key in [
        "smoothness_score",
        "total_frames",
        "duration",
        "fps",
        "cancelled",
        "duplicate_detection",
        "frame_times_ms",
        "capture_frame_times_ms",
        "smoothness",
        "timing",
        "stutter_events",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    for key in ["average", "one_percent_low", "point_one_percent_low", "maximum"] {
        assert!(json["frame_times_ms"].get(key).is_some(), "missing frame_times_ms.{key}");
    }
    assert!(json["smoothness"].get("avg_to_1pct_ratio").is_some());
}

#[test]
fn json_values_match_report() {
    let report = with_freezes(&[(40, 10), (50, 0)]);
    let json = report.to_json();

    assert_eq!(json["total_frames"], 100);
    assert_eq!(json["duplicate_detection"]["duplicate_frames"], 10);
    assert_eq!(json["duplicate_detection"]["stutter_frames"], 10);
    assert_eq!(json["duplicate_detection"]["moving_frames"], 95);
    assert_eq!(json["cancelled"], false);

    let events = json["stutter_events"].as_array().expect("events array");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["duplicate_count"], 10);
    assert_eq!(events[0]["frame_index"], 40);
    assert_eq!(events[0]["frametime_ms"], 183.34);
    assert_eq!(events[0]["timestamp"], 0.667);

    let score = json["smoothness_score"].as_f64().expect("score");
    assert!((score - 78.9).abs() < 1e-9, "got {score}");
}

#[test]
fn json_uses_null_for_missing_metrics() {
    let frames = vec![Ok::<_, JudderError>(gradient(0, 0))];
    let json = judder::analyze(frames).expect("report").to_json();

    assert!(json["smoothness_score"].is_null());
    assert!(json["frame_times_ms"]["average"].is_null());
    assert_eq!(json["total_frames"], 1);
}

// ── Text ──────────────────────────────────────────────────────────

#[test]
fn text_report_sections() {
    let text = with_freezes(&[(40, 10), (50, 0)]).to_string();

    assert!(text.contains("FRAME TIME ANALYSIS"));
    assert!(text.contains("SMOOTHNESS SCORE: 78.9/100"));
    assert!(text.contains("Duplicate frames: 10 (10.1%)"));
    assert!(text.contains("Stutter Events (duplicates during motion): 1"));
    assert!(text.contains("(10 dup, motion="));
    assert!(text.contains("Total stutter frames: 10"));
}

#[test]
fn text_report_without_stutter() {
    let text = with_freezes(&[(60, 0)]).to_string();
    assert!(text.contains("No stutters detected"));
    assert!(text.contains("Excellent"));
}

#[test]
fn text_report_lists_ten_worst_events() {
    let pattern: Vec<(u64, u64)> = (1..=12).map(|run| (8, run)).collect();
    let report = with_freezes(&pattern);
    assert_eq!(report.stutter_events.len(), 12);

    let text = report.to_string();
    assert!(text.contains("[10]"));
    assert!(!text.contains("[11]"));
    assert!(text.contains("... and 2 more"));
    // The longest freeze is listed first.
    assert!(text.contains("[1] @") && text.contains("(12 dup"));
    let worst = report.worst_stutter_events();
    assert_eq!(worst[0].duplicate_count, 12);
}

#[test]
fn text_report_for_single_frame() {
    let frames = vec![Ok::<_, JudderError>(gradient(0, 0))];
    let text = judder::analyze(frames).expect("report").to_string();
    assert!(text.contains("n/a"));
}

// ── Rating ────────────────────────────────────────────────────────

#[test]
fn rating_follows_pacing() {
    assert_eq!(with_freezes(&[(60, 0)]).rating(), Some(SmoothnessRating::Excellent));
    assert_eq!(
        with_freezes(&[(40, 10), (50, 0)]).rating(),
        Some(SmoothnessRating::Poor)
    );
}
