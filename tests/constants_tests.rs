// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use photobooth::FilterType;
use photobooth::constants::{self, encoding, methods, timing};
use std::time::Duration;

#[test]
fn test_channel_name() {
    assert_eq!(constants::CHANNEL_NAME, "com.example.photobooth/camera");
}

#[test]
fn test_method_names() {
    assert_eq!(
        methods::ALL,
        [
            "checkCameraPermission",
            "requestCameraPermission",
            "setFilter",
            "takePicture"
        ]
    );
    assert_eq!(methods::FILTER_ARGUMENT, "filter");
}

#[test]
fn test_filter_names_are_unique_and_resolve() {
    let names: Vec<&str> = FilterType::ALL.iter().map(|f| f.name()).collect();
    assert_eq!(names, ["none", "smooth", "brightness", "grayscale", "vintage"]);

    for filter in FilterType::ALL {
        assert_eq!(FilterType::from_name(filter.name()), filter);
    }
}

#[test]
fn test_capture_defaults() {
    assert_eq!(encoding::JPEG_QUALITY, 90);
    assert_eq!(timing::SETTLE_DELAY, Duration::from_millis(500));
    assert!(timing::CAPTURE_TIMEOUT > timing::SETTLE_DELAY);
}
