// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Name of the method channel the GUI host talks to
pub const CHANNEL_NAME: &str = "com.example.photobooth/camera";

/// Names of the remote operations exposed on the channel
pub mod methods {
    pub const CHECK_CAMERA_PERMISSION: &str = "checkCameraPermission";
    pub const REQUEST_CAMERA_PERMISSION: &str = "requestCameraPermission";
    pub const SET_FILTER: &str = "setFilter";
    pub const TAKE_PICTURE: &str = "takePicture";

    /// Argument key carrying the filter name for `setFilter`
    pub const FILTER_ARGUMENT: &str = "filter";

    /// Every operation the channel answers, in declaration order
    pub const ALL: [&str; 4] = [
        CHECK_CAMERA_PERMISSION,
        REQUEST_CAMERA_PERMISSION,
        SET_FILTER,
        TAKE_PICTURE,
    ];
}

/// Parameters of the fixed filter set
pub mod filter_params {
    /// Gaussian blur sigma for `smooth`
    pub const SMOOTH_BLUR_RADIUS: f32 = 2.0;

    /// Additive brightness for `brightness` (normalized channel units)
    pub const BRIGHTNESS_OFFSET: f32 = 0.3;

    /// Saturation multiplier for `brightness`
    pub const BRIGHTNESS_SATURATION: f32 = 1.1;

    /// Sepia blend intensity for `vintage`
    pub const SEPIA_INTENSITY: f32 = 0.8;

    /// Vignette intensity for `vintage`
    pub const VIGNETTE_INTENSITY: f32 = 2.0;

    /// Rec.709 luma coefficients
    pub const LUMA_R: f32 = 0.2126;
    pub const LUMA_G: f32 = 0.7152;
    pub const LUMA_B: f32 = 0.0722;
}

/// JPEG output settings
pub mod encoding {
    /// JPEG quality on the 0-100 scale (0.9 of maximum)
    pub const JPEG_QUALITY: u8 = 90;
}

/// Capture timing
pub mod timing {
    use super::Duration;

    /// Wait after session start before the photo request is issued.
    ///
    /// Lets auto-exposure and focus settle. This is a heuristic, not a
    /// convergence guarantee.
    pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

    /// Default watchdog for a single photo request
    pub const CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

    /// GStreamer state change timeout on start
    pub const START_TIMEOUT_SECS: u64 = 5;

    /// GStreamer state change timeout on stop
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Poll interval for bus errors while a photo request is armed
    pub const BUS_POLL_INTERVAL_MS: u64 = 100;
}

/// Pipeline element settings
pub mod pipeline {
    /// Pixel format negotiated at the appsink
    pub const OUTPUT_FORMAT: &str = "RGBA";

    /// Appsink buffer queue size; only the newest frame matters
    pub const MAX_BUFFERS: u32 = 1;
}
