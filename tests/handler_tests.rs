// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the camera handler against the fake backends

use photobooth::backends::camera::fake::{FakeBackend, FakeFailure, SessionStats};
use photobooth::backends::permission::FakePermission;
use photobooth::pipelines::photo::{CaptureSettings, PhotoEncoder};
use photobooth::{CameraError, CameraHandler};
use std::sync::Arc;
use std::time::Duration;

fn settings() -> CaptureSettings {
    CaptureSettings {
        settle_delay: Duration::from_millis(5),
        capture_timeout: Some(Duration::from_millis(300)),
        ..CaptureSettings::default()
    }
}

fn handler_with(backend: FakeBackend, permission: FakePermission) -> (CameraHandler, Arc<SessionStats>) {
    let stats = backend.stats();
    let handler = CameraHandler::new(
        Arc::new(backend),
        Arc::new(permission),
        settings(),
        PhotoEncoder::new(),
    );
    (handler, stats)
}

fn decode(bytes: &[u8]) -> image::RgbImage {
    image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg)
        .expect("valid JPEG")
        .to_rgb8()
}

#[tokio::test]
async fn test_denied_permission_never_opens_a_session() {
    let (handler, stats) = handler_with(FakeBackend::new(64, 48), FakePermission::denied());

    let err = handler.take_picture().await.unwrap_err();
    assert_eq!(err, CameraError::PermissionDenied);
    assert_eq!(stats.created(), 0);
    assert_eq!(stats.started(), 0);
}

#[tokio::test]
async fn test_session_stopped_on_every_branch() {
    let failures = [
        FakeFailure::Never,
        FakeFailure::NoDevice,
        FakeFailure::Input,
        FakeFailure::Output,
        FakeFailure::Commit,
        FakeFailure::Start,
        FakeFailure::Capture,
        FakeFailure::EmptyFrame,
        FakeFailure::Hang,
    ];

    for failure in failures {
        let backend = FakeBackend::new(32, 32).failing_at(failure);
        let (handler, stats) = handler_with(backend, FakePermission::authorized());

        let result = handler.take_picture().await;
        assert_eq!(result.is_ok(), failure == FakeFailure::Never, "{:?}", failure);
        assert_eq!(stats.stopped(), stats.created(), "{:?}", failure);
        assert_eq!(stats.running(), 0, "{:?} left a session running", failure);
    }
}

#[tokio::test]
async fn test_hung_capture_times_out() {
    let backend = FakeBackend::new(32, 32).failing_at(FakeFailure::Hang);
    let (handler, stats) = handler_with(backend, FakePermission::authorized());

    let err = handler.take_picture().await.unwrap_err();
    assert!(matches!(err, CameraError::CaptureError(_)), "{:?}", err);
    assert_eq!(stats.photos_requested(), 1);
    assert_eq!(stats.running(), 0);
}

#[tokio::test]
async fn test_vintage_differs_from_none() {
    let (handler, _) = handler_with(FakeBackend::new(64, 48), FakePermission::authorized());

    handler.set_filter("none");
    let plain = decode(&handler.take_picture().await.unwrap());

    handler.set_filter("vintage");
    let vintage = decode(&handler.take_picture().await.unwrap());

    assert_eq!(plain.dimensions(), (64, 48));
    assert_eq!(vintage.dimensions(), plain.dimensions());

    let difference: u64 = plain
        .as_raw()
        .iter()
        .zip(vintage.as_raw())
        .map(|(a, b)| (*a as i32 - *b as i32).unsigned_abs() as u64)
        .sum();
    assert!(difference > 0, "vintage output matches plain output");
}

#[tokio::test]
async fn test_unknown_filter_matches_none() {
    let (handler, _) = handler_with(FakeBackend::new(48, 32), FakePermission::authorized());

    handler.set_filter("none");
    let plain = handler.take_picture().await.unwrap();

    handler.set_filter("sparkles");
    let unknown = handler.take_picture().await.unwrap();

    // Same frame, same encoder settings
    assert_eq!(plain, unknown);
}

#[tokio::test]
async fn test_sequential_captures_are_independent() {
    let (handler, stats) = handler_with(FakeBackend::new(48, 32), FakePermission::authorized());

    handler.set_filter("grayscale");
    let gray = decode(&handler.take_picture().await.unwrap());

    handler.set_filter("brightness");
    let bright = decode(&handler.take_picture().await.unwrap());

    assert_eq!(stats.created(), 2);
    assert_eq!(stats.stopped(), 2);

    // Grayscale pixels have equal channels (within JPEG error), the brightened ones do not
    let gray_spread = channel_spread(&gray);
    let bright_spread = channel_spread(&bright);
    assert!(gray_spread < bright_spread, "{} vs {}", gray_spread, bright_spread);
}

#[tokio::test]
async fn test_concurrent_captures_are_serialized() {
    let (handler, stats) = handler_with(FakeBackend::new(32, 32), FakePermission::authorized());
    let handler = Arc::new(handler);

    let first = tokio::spawn({
        let handler = handler.clone();
        async move { handler.take_picture().await }
    });
    let second = tokio::spawn({
        let handler = handler.clone();
        async move { handler.take_picture().await }
    });

    assert!(first.await.unwrap().is_ok());
    assert!(second.await.unwrap().is_ok());
    assert_eq!(stats.created(), 2);
    assert_eq!(stats.stopped(), 2);
    assert_eq!(stats.running(), 0);
}

#[tokio::test]
async fn test_permission_request_then_capture() {
    let (handler, stats) = handler_with(FakeBackend::new(16, 16), FakePermission::new(true));

    assert!(!handler.check_camera_permission());
    assert!(handler.take_picture().await.is_err());
    assert_eq!(stats.created(), 0);

    assert!(handler.request_camera_permission().await);
    assert!(handler.take_picture().await.is_ok());
}

/// Mean absolute difference between the largest and smallest channel per pixel
fn channel_spread(image: &image::RgbImage) -> f64 {
    let total: u64 = image
        .pixels()
        .map(|p| {
            let max = p.0.iter().max().copied().unwrap_or(0);
            let min = p.0.iter().min().copied().unwrap_or(0);
            (max - min) as u64
        })
        .sum();
    total as f64 / (image.width() * image.height()) as f64
}
