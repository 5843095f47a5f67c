// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │   CaptureAdapter    │  ← one session per photo
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraBackend trait │  ← device discovery, session factory
//! └──────────┬──────────┘
//!            │
//!            ▼
//!   ┌────────┴────────┐
//!   │ V4L2/GStreamer  │  Fake (tests)
//!   └─────────────────┘
//! ```
//!
//! A session is configured in three steps (input, output, commit), started,
//! asked for exactly one photo, and stopped.

pub mod fake;
pub mod types;
pub mod v4l2;

pub use types::*;

/// Camera backend: finds devices and creates capture sessions
pub trait CameraBackend: Send + Sync {
    /// Enumerate available capture devices
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// The device a session binds when none is chosen explicitly
    fn default_device(&self) -> Option<CameraDevice>;

    /// Create an unconfigured session at the given preset
    fn create_session(&self, preset: SessionPreset) -> BackendResult<Box<dyn CaptureSession>>;
}

/// An ephemeral binding of one input device to one still-photo output
pub trait CaptureSession: Send {
    /// Open and bind the video input device
    fn add_input(&mut self, device: &CameraDevice) -> BackendResult<()>;

    /// Attach the still-photo output sink
    fn add_output(&mut self) -> BackendResult<()>;

    /// Connect input to output. Fails if they cannot be linked.
    fn commit_configuration(&mut self) -> BackendResult<()>;

    /// Start frames flowing. Blocks until the device is streaming.
    fn start_running(&mut self) -> BackendResult<()>;

    /// Issue one photo request.
    ///
    /// The returned receiver is fulfilled exactly once, with the still or
    /// with the error the backend reported.
    fn capture_photo(&mut self) -> BackendResult<PhotoReceiver>;

    /// Stop the session and release the device. Safe to call more than once.
    fn stop_running(&mut self);

    /// Check if the session is currently streaming
    fn is_running(&self) -> bool;
}
