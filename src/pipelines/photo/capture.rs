// SPDX-License-Identifier: GPL-3.0-only

//! Single-photo capture from a camera backend
//!
//! Every call builds its own session, waits for the sensor to settle,
//! issues exactly one photo request and tears the session down again,
//! whichever way the call ends.

use crate::backends::camera::{CameraBackend, CapturedStill, CaptureSession, SessionPreset};
use crate::backends::permission::PermissionProvider;
use crate::errors::{CameraError, CameraResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Capture timing and session settings
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub preset: SessionPreset,
    /// Wait between session start and the photo request
    pub settle_delay: Duration,
    /// Watchdog for the photo request; `None` waits indefinitely
    pub capture_timeout: Option<Duration>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            preset: SessionPreset::default(),
            settle_delay: crate::constants::timing::SETTLE_DELAY,
            capture_timeout: Some(crate::constants::timing::CAPTURE_TIMEOUT),
        }
    }
}

/// Stops the session when dropped, so every exit path releases the device.
///
/// Normal exits hand the guard to [`close_session`]; dropping it in place only
/// happens when the capture future is cancelled.
struct SessionGuard(Box<dyn CaptureSession>);

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.0.stop_running();
    }
}

/// Owns the camera for the duration of one photo at a time
pub struct CaptureAdapter {
    backend: Arc<dyn CameraBackend>,
    permission: Arc<dyn PermissionProvider>,
    settings: CaptureSettings,
    /// Serializes captures; a second caller waits for the first to finish
    in_flight: Mutex<()>,
}

impl CaptureAdapter {
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        permission: Arc<dyn PermissionProvider>,
        settings: CaptureSettings,
    ) -> Self {
        Self {
            backend,
            permission,
            settings,
            in_flight: Mutex::new(()),
        }
    }

    /// Capture one still
    ///
    /// # Returns
    /// * `Ok(CapturedStill)` - The frame delivered by the session
    /// * `Err(CameraError::PermissionDenied)` - Not authorized; no device was opened
    /// * `Err(CameraError::DeviceUnavailable)` - No device, or it could not be opened
    /// * `Err(CameraError::OutputUnavailable)` - The photo output could not be attached
    /// * `Err(CameraError::CaptureError)` - The session failed, timed out or returned nothing
    pub async fn capture(&self) -> CameraResult<CapturedStill> {
        let _in_flight = self.in_flight.lock().await;

        if !self.permission.status().is_authorized() {
            error!("Camera permission not granted");
            return Err(CameraError::PermissionDenied);
        }

        // Opening, starting and stopping a session all block on the device
        let backend = self.backend.clone();
        let settings = self.settings.clone();
        let mut guard = tokio::task::spawn_blocking(move || Self::open_session(backend, &settings))
            .await
            .map_err(|e| CameraError::CaptureError(format!("Session start task error: {}", e)))??;

        debug!(running = guard.0.is_running(), "Session settled");
        let receiver = match guard.0.capture_photo() {
            Ok(receiver) => receiver,
            Err(e) => {
                close_session(guard).await;
                return Err(e.into());
            }
        };
        info!("Photo requested");

        let outcome = match self.settings.capture_timeout {
            Some(limit) => match tokio::time::timeout(limit, receiver).await {
                Ok(received) => received,
                Err(_) => {
                    close_session(guard).await;
                    error!(timeout_ms = limit.as_millis() as u64, "Photo request timed out");
                    return Err(CameraError::CaptureError(format!(
                        "No photo within {} ms",
                        limit.as_millis()
                    )));
                }
            },
            None => receiver.await,
        };
        close_session(guard).await;

        let still = outcome
            .map_err(|_| CameraError::CaptureError("Session ended without a photo".to_string()))?
            .map_err(|e| {
                error!(error = %e, "Error capturing photo");
                CameraError::from(e)
            })?;

        if still.data.is_empty() || still.width == 0 || still.height == 0 {
            error!("Could not get image data");
            return Err(CameraError::CaptureError("No usable image data".to_string()));
        }

        info!(
            width = still.width,
            height = still.height,
            age_ms = still.captured_at.elapsed().as_millis() as u64,
            "Photo captured"
        );
        Ok(still)
    }

    /// Create, configure, start and settle a session. Runs on a blocking thread.
    fn open_session(backend: Arc<dyn CameraBackend>, settings: &CaptureSettings) -> CameraResult<SessionGuard> {
        let mut guard = SessionGuard(
            backend
                .create_session(settings.preset)
                .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?,
        );

        let device = backend.default_device().ok_or_else(|| {
            error!("Cannot access camera device");
            CameraError::DeviceUnavailable("No video capture device found".to_string())
        })?;

        guard
            .0
            .add_input(&device)
            .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?;
        guard
            .0
            .add_output()
            .map_err(|e| CameraError::OutputUnavailable(e.to_string()))?;
        guard
            .0
            .commit_configuration()
            .map_err(|e| CameraError::OutputUnavailable(e.to_string()))?;
        debug!(device = %device, preset = ?settings.preset, "Session configured");

        guard
            .0
            .start_running()
            .map_err(|e| CameraError::CaptureError(e.to_string()))?;
        std::thread::sleep(settings.settle_delay);
        Ok(guard)
    }
}

/// Stop a session on a blocking thread and wait for it
async fn close_session(guard: SessionGuard) {
    if let Err(e) = tokio::task::spawn_blocking(move || drop(guard)).await {
        warn!(error = %e, "Session stop task failed");
    }
}
