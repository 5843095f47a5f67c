// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 camera backend
//!
//! Devices are discovered through V4L2 nodes; frames are pulled through a
//! GStreamer pipeline built per capture session.

mod enumeration;
mod pipeline;

pub use enumeration::{enumerate_v4l2_cameras, select_default_device};
pub use pipeline::GstCaptureSession;

use super::{BackendError, BackendResult, CameraBackend, CameraDevice, CameraSource, CaptureSession, SessionPreset};
use tracing::debug;

/// Camera backend using V4L2 discovery and GStreamer capture
pub struct V4l2Backend {
    source: CameraSource,
    configured_device: Option<String>,
}

impl V4l2Backend {
    /// Create a backend.
    ///
    /// # Arguments
    /// * `source` - GStreamer source element family
    /// * `configured_device` - Explicit device node; the first capture node is used when `None`
    pub fn new(source: CameraSource, configured_device: Option<String>) -> Self {
        Self {
            source,
            configured_device,
        }
    }
}

impl CameraBackend for V4l2Backend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        enumerate_v4l2_cameras()
    }

    fn default_device(&self) -> Option<CameraDevice> {
        if self.source == CameraSource::PipeWire && self.configured_device.is_none() {
            // pipewiresrc picks the session default itself
            return Some(CameraDevice {
                name: "PipeWire default camera".to_string(),
                ..CameraDevice::default()
            });
        }
        select_default_device(self.configured_device.as_deref(), &self.enumerate_cameras())
    }

    fn create_session(&self, preset: SessionPreset) -> BackendResult<Box<dyn CaptureSession>> {
        gstreamer::init().map_err(|e| BackendError::NotAvailable(e.to_string()))?;
        debug!(source = %self.source, preset = ?preset, "Creating capture session");
        Ok(Box::new(GstCaptureSession::new(self.source, preset)))
    }
}
