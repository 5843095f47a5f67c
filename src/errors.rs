// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the camera bridge

use crate::backends::camera::BackendError;
use std::fmt;

/// Result type alias using CameraError
pub type CameraResult<T> = Result<T, CameraError>;

/// Call-level failures. All are terminal for the current call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// Camera access has not been granted
    PermissionDenied,
    /// The video input device could not be opened or bound
    DeviceUnavailable(String),
    /// The still-photo output sink could not be attached
    OutputUnavailable(String),
    /// The capture reported an error or produced no usable image data
    CaptureError(String),
    /// The filtered image could not be encoded as JPEG
    EncodeError(String),
    /// A channel call was missing a required argument
    InvalidArgument(String),
    /// No camera handler is attached to the channel
    HandlerUnavailable,
}

/// Short error codes reported to the GUI host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Unavailable,
    InvalidArgument,
    CaptureFailed,
}

impl ErrorCode {
    /// Wire representation of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unavailable => "UNAVAILABLE",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::CaptureFailed => "CAPTURE_FAILED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CameraError {
    /// Host error code for this failure
    pub fn code(&self) -> ErrorCode {
        match self {
            CameraError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            CameraError::HandlerUnavailable => ErrorCode::Unavailable,
            CameraError::PermissionDenied
            | CameraError::DeviceUnavailable(_)
            | CameraError::OutputUnavailable(_)
            | CameraError::CaptureError(_)
            | CameraError::EncodeError(_) => ErrorCode::CaptureFailed,
        }
    }

    /// Message shown to the host alongside the code
    pub fn host_message(&self) -> String {
        match self {
            CameraError::InvalidArgument(msg) => msg.clone(),
            CameraError::HandlerUnavailable => "Camera handler not available".to_string(),
            _ => "Failed to capture photo".to_string(),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::PermissionDenied => write!(f, "Camera permission not granted"),
            CameraError::DeviceUnavailable(msg) => write!(f, "Cannot access camera device: {}", msg),
            CameraError::OutputUnavailable(msg) => write!(f, "Cannot add photo output: {}", msg),
            CameraError::CaptureError(msg) => write!(f, "Error capturing photo: {}", msg),
            CameraError::EncodeError(msg) => write!(f, "Could not convert to JPEG: {}", msg),
            CameraError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CameraError::HandlerUnavailable => write!(f, "Camera handler not available"),
        }
    }
}

impl std::error::Error for CameraError {}

impl From<image::ImageError> for CameraError {
    fn from(err: image::ImageError) -> Self {
        CameraError::EncodeError(err.to_string())
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read or written
    Io(std::io::Error),
    /// The config file is not valid JSON for [`crate::Config`]
    Parse(serde_json::Error),
    /// No per-user config directory could be determined
    NoConfigDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid configuration: {}", e),
            ConfigError::NoConfigDir => write!(f, "No user configuration directory available"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// Maps a backend failure raised while a photo request is pending
impl From<BackendError> for CameraError {
    fn from(err: BackendError) -> Self {
        CameraError::CaptureError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_failures_share_code() {
        for err in [
            CameraError::PermissionDenied,
            CameraError::DeviceUnavailable("busy".into()),
            CameraError::OutputUnavailable("no sink".into()),
            CameraError::CaptureError("eos".into()),
            CameraError::EncodeError("empty".into()),
        ] {
            assert_eq!(err.code(), ErrorCode::CaptureFailed);
            assert_eq!(err.host_message(), "Failed to capture photo");
        }
    }

    #[test]
    fn test_host_codes() {
        assert_eq!(
            CameraError::InvalidArgument("Filter name required".into()).code().as_str(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(CameraError::HandlerUnavailable.code().as_str(), "UNAVAILABLE");
        assert_eq!(
            CameraError::HandlerUnavailable.host_message(),
            "Camera handler not available"
        );
    }
}
