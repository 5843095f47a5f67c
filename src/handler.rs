// SPDX-License-Identifier: GPL-3.0-only

//! Camera handler
//!
//! Owns the filter selection and the capture pipeline, and answers the four
//! camera operations the GUI host can call.

use crate::backends::camera::v4l2::V4l2Backend;
use crate::backends::camera::CameraBackend;
use crate::backends::permission::{DevicePermission, PermissionProvider, PermissionStatus};
use crate::config::Config;
use crate::errors::CameraResult;
use crate::filters::{FilterSelector, FilterType};
use crate::pipelines::photo::{CaptureAdapter, CaptureSettings, EncodedImage, PhotoEncoder, PhotoPipeline};
use std::sync::Arc;
use tracing::{debug, info};

/// The camera bridge's single owned state object
pub struct CameraHandler {
    permission: Arc<dyn PermissionProvider>,
    filters: FilterSelector,
    pipeline: PhotoPipeline,
}

impl CameraHandler {
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        permission: Arc<dyn PermissionProvider>,
        settings: CaptureSettings,
        encoder: PhotoEncoder,
    ) -> Self {
        let capture = CaptureAdapter::new(backend, permission.clone(), settings);
        Self {
            permission,
            filters: FilterSelector::default(),
            pipeline: PhotoPipeline::new(capture, encoder),
        }
    }

    /// Build a handler for the system camera described by `config`
    pub fn from_config(config: &Config) -> Self {
        let backend = Arc::new(V4l2Backend::new(config.source, config.device.clone()));
        let permission = Arc::new(DevicePermission::new(config.device.clone()));
        let settings = CaptureSettings {
            preset: config.preset,
            settle_delay: config.settle_delay(),
            capture_timeout: config.capture_timeout(),
        };

        let handler = Self::new(
            backend,
            permission,
            settings,
            PhotoEncoder::with_quality(config.jpeg_quality()),
        );
        handler.filters.set_filter(&config.default_filter);
        handler
    }

    /// Current authorization, without prompting
    pub fn check_camera_permission(&self) -> bool {
        let status = self.permission.status();
        debug!(?status, "Camera permission checked");
        status == PermissionStatus::Authorized
    }

    /// Prompt for access if undecided and report the outcome
    pub async fn request_camera_permission(&self) -> bool {
        let granted = self.permission.request().await;
        info!(granted, "Camera permission request completed");
        granted
    }

    /// Select the filter applied to subsequent photos. Any name is accepted.
    pub fn set_filter(&self, name: &str) {
        self.filters.set_filter(name);
    }

    /// The filter the next photo will use
    pub fn current_filter(&self) -> FilterType {
        self.filters.current()
    }

    /// Capture one photo with the current filter and return its JPEG bytes
    pub async fn take_picture(&self) -> CameraResult<Vec<u8>> {
        let EncodedImage { data, .. } = self.pipeline.take(&self.filters).await?;
        info!(bytes = data.len(), "Picture taken");
        Ok(data)
    }
}
