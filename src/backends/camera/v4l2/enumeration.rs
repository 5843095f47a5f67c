// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 capture device enumeration

use super::super::types::CameraDevice;
use tracing::{debug, info};
use v4l::capability::Flags;

/// Enumerate `/dev/video*` nodes that can capture video, ordered by index
pub fn enumerate_v4l2_cameras() -> Vec<CameraDevice> {
    let mut cameras = Vec::new();

    for node in v4l::context::enum_devices() {
        let path = node.path().to_string_lossy().to_string();

        let device = match v4l::Device::with_path(node.path()) {
            Ok(device) => device,
            Err(e) => {
                debug!(path = %path, error = %e, "Skipping device that cannot be opened");
                continue;
            }
        };

        let caps = match device.query_caps() {
            Ok(caps) => caps,
            Err(e) => {
                debug!(path = %path, error = %e, "Skipping device without capabilities");
                continue;
            }
        };

        // Metadata nodes share the card name but cannot stream frames
        if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
            debug!(path = %path, card = %caps.card, "Skipping non-capture node");
            continue;
        }

        cameras.push(CameraDevice {
            name: node.name().unwrap_or_else(|| caps.card.clone()),
            path,
            driver: caps.driver,
            index: node.index(),
        });
    }

    cameras.sort_by_key(|camera| camera.index);
    info!(count = cameras.len(), "Enumerated V4L2 cameras");
    cameras
}

/// Pick the session's device: the configured path when set, otherwise the first camera
pub fn select_default_device(
    configured: Option<&str>,
    cameras: &[CameraDevice],
) -> Option<CameraDevice> {
    match configured {
        Some(path) => Some(
            cameras
                .iter()
                .find(|camera| camera.path == path)
                .cloned()
                .unwrap_or_else(|| CameraDevice {
                    name: path.to_string(),
                    path: path.to_string(),
                    ..CameraDevice::default()
                }),
        ),
        None => cameras.first().cloned(),
    }
}
