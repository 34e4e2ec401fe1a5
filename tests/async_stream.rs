//! Async frame stream tests.

#![cfg(feature = "async")]

use std::time::Duration;

use judder::{AnalysisOptions, CancellationToken, Frame, FrameStream, JudderError};
use tokio_stream::StreamExt;

fn frames(count: u64, freeze_at: u64) -> Vec<Result<Frame, JudderError>> {
    (0..count)
        .map(|index| {
            let content = if (freeze_at..freeze_at + 5).contains(&index) {
                freeze_at - 1
            } else {
                index
            };
            let luma = (0..16u64)
                .map(|x| ((x * 16 + content * 8) % 256) as u8)
                .collect();
            Ok(Frame::from_luma(16, 1, luma, Duration::from_micros(index * 16_667)))
        })
        .collect()
}

#[tokio::test]
async fn stream_yields_every_frame() {
    let stream = FrameStream::spawn(|| Ok(frames(50, 20)));
    let collected: Vec<_> = stream.collect().await;

    assert_eq!(collected.len(), 50);
    assert!(collected.iter().all(Result::is_ok));
}

#[tokio::test]
async fn stream_analysis_matches_blocking_analysis() {
    let options = AnalysisOptions::new();
    let stream = FrameStream::spawn_with_capacity(|| Ok(frames(80, 30)), 2);
    let streamed = judder::analyze_stream(stream, &options)
        .await
        .expect("stream analysis");

    let blocking = judder::analyze(frames(80, 30)).expect("blocking analysis");
    assert_eq!(streamed, blocking);
    assert_eq!(streamed.stutter_events.len(), 1);
}

#[tokio::test]
async fn open_error_reaches_consumer() {
    let stream = FrameStream::spawn(|| {
        Err::<Vec<Result<Frame, JudderError>>, _>(JudderError::NoVideoStream)
    });
    let result = judder::analyze_stream(stream, &AnalysisOptions::new()).await;
    assert!(matches!(result, Err(JudderError::NoVideoStream)));
}

#[tokio::test]
async fn empty_stream_is_insufficient_data() {
    let stream = FrameStream::spawn(|| Ok(Vec::<Result<Frame, JudderError>>::new()));
    let result = judder::analyze_stream(stream, &AnalysisOptions::new()).await;
    assert!(matches!(result, Err(JudderError::InsufficientData { frames: 0 })));
}

#[tokio::test]
async fn cancelled_before_first_frame_is_insufficient_data() {
    let token = CancellationToken::new();
    token.cancel();
    let options = AnalysisOptions::new().with_cancellation(token);

    let stream = FrameStream::spawn(|| Ok(frames(20, 10)));
    let result = judder::analyze_stream(stream, &options).await;
    assert!(matches!(result, Err(JudderError::InsufficientData { frames: 0 })));
}

#[tokio::test]
async fn dropping_stream_early_is_harmless() {
    let mut stream = FrameStream::spawn(|| Ok(frames(500, 100)));
    let first = stream.next().await.expect("first frame").expect("frame");
    assert_eq!(first.timestamp(), Duration::ZERO);
    drop(stream);
}
