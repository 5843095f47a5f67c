// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tokio::sync::oneshot;

/// GStreamer source used to open the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CameraSource {
    /// `v4l2src` bound to a `/dev/videoN` node
    #[default]
    V4l2,
    /// `pipewiresrc` bound to the session's default camera
    PipeWire,
}

impl CameraSource {
    /// GStreamer element factory name
    pub fn element_name(&self) -> &'static str {
        match self {
            CameraSource::V4l2 => "v4l2src",
            CameraSource::PipeWire => "pipewiresrc",
        }
    }

    /// Element property that selects the device, if the source takes one
    pub fn device_property(&self) -> Option<&'static str> {
        match self {
            CameraSource::V4l2 => Some("device"),
            CameraSource::PipeWire => None,
        }
    }
}

impl std::fmt::Display for CameraSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraSource::V4l2 => write!(f, "V4L2"),
            CameraSource::PipeWire => write!(f, "PipeWire"),
        }
    }
}

/// Session resolution preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionPreset {
    /// Photo quality: let the device negotiate its preferred still resolution
    #[default]
    Photo,
    /// 1280x720
    Hd,
    /// 640x480
    Vga,
}

impl SessionPreset {
    /// Fixed output dimensions, or `None` to negotiate
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            SessionPreset::Photo => None,
            SessionPreset::Hd => Some((1280, 720)),
            SessionPreset::Vga => Some((640, 480)),
        }
    }
}

/// A video capture device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraDevice {
    /// Card name reported by the driver
    pub name: String,
    /// Device node (e.g. `/dev/video0`). Empty for the source's default device.
    pub path: String,
    /// Kernel driver name
    pub driver: String,
    /// V4L2 node index
    pub index: usize,
}

impl std::fmt::Display for CameraDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.path)
        }
    }
}

/// One still frame handed back by a capture session.
///
/// Pixels are packed RGBA, `stride` bytes per row (rows may be padded).
#[derive(Clone)]
pub struct CapturedStill {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub data: Vec<u8>,
    /// Timestamp when the frame reached the sink
    pub captured_at: Instant,
}

impl std::fmt::Debug for CapturedStill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedStill")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("data", &format_args!("{} bytes", self.data.len()))
            .finish()
    }
}

/// Single-shot result of a photo request
pub type PhotoReceiver = oneshot::Receiver<BackendResult<CapturedStill>>;

/// Sending half of a photo request
pub type PhotoSender = oneshot::Sender<BackendResult<CapturedStill>>;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend is not available on this system
    NotAvailable(String),
    /// Camera device not found or could not be opened
    DeviceNotFound(String),
    /// Pipeline elements could not be created or linked
    LinkFailed(String),
    /// Session failed to start
    InitializationFailed(String),
    /// The capture reported an error
    CaptureFailed(String),
    /// The capture finished without usable image data
    InvalidFrame(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::LinkFailed(msg) => write!(f, "Link failed: {}", msg),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::CaptureFailed(msg) => write!(f, "Capture failed: {}", msg),
            BackendError::InvalidFrame(msg) => write!(f, "Invalid frame: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&CameraSource::PipeWire).unwrap(), "\"pipewire\"");
        assert_eq!(
            serde_json::from_str::<SessionPreset>("\"hd\"").unwrap(),
            SessionPreset::Hd
        );
    }

    #[test]
    fn test_photo_preset_negotiates() {
        assert_eq!(SessionPreset::Photo.dimensions(), None);
        assert_eq!(SessionPreset::Vga.dimensions(), Some((640, 480)));
    }
}
