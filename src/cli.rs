// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for camera operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Checking and requesting camera permission
//! - Taking a single filtered photo
//! - Serving the method channel over stdio

use chrono::Local;
use photobooth::backends::camera::CameraBackend;
use photobooth::backends::camera::v4l2::V4l2Backend;
use photobooth::channel::{CameraChannel, transport};
use photobooth::pipelines::photo::PhotoEncoder;
use photobooth::{CameraHandler, Config, FilterType};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Default folder name for saving photos
const DEFAULT_SAVE_FOLDER: &str = "photobooth";

/// List all available cameras
pub fn list_cameras(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let backend = V4l2Backend::new(config.source, config.device.clone());
    let cameras = backend.enumerate_cameras();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    let default_path = backend.default_device().map(|device| device.path);

    println!("Available cameras:");
    println!();
    for camera in &cameras {
        let marker = if default_path.as_deref() == Some(camera.path.as_str()) {
            " (default)"
        } else {
            ""
        };
        println!("  [{}] {}{}", camera.index, camera.name, marker);
        println!("      Device: {}", camera.path);
        println!("      Driver: {}", camera.driver);
        println!();
    }

    Ok(())
}

/// Print every recognized filter name
pub fn list_filters(config: &Config) {
    let configured = FilterType::from_name(&config.default_filter);
    for filter in FilterType::ALL {
        if filter == configured {
            println!("{} (default)", filter);
        } else {
            println!("{}", filter);
        }
    }
}

/// Report camera permission, optionally prompting for it
pub fn permission(config: &Config, request: bool) -> Result<(), Box<dyn std::error::Error>> {
    let handler = CameraHandler::from_config(config);

    let granted = if request {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(handler.request_camera_permission())
    } else {
        handler.check_camera_permission()
    };

    println!("{}", if granted { "granted" } else { "denied" });
    Ok(())
}

/// Take one photo with the given filter and save it as JPEG
pub fn take_photo(
    config: &Config,
    filter: Option<String>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let handler = CameraHandler::from_config(config);
    if let Some(filter) = filter {
        handler.set_filter(&filter);
    }

    let output_path = output.unwrap_or_else(|| {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        get_default_photo_dir().join(format!("photo_{}.jpg", timestamp))
    });

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        if !handler.check_camera_permission() && !handler.request_camera_permission().await {
            return Err("Camera permission not granted".into());
        }

        println!("Capturing with filter: {}", handler.current_filter());
        let bytes = handler.take_picture().await?;
        let saved = PhotoEncoder::save(&bytes, &output_path).await?;
        println!("Photo saved: {} ({} bytes)", saved.display(), bytes.len());
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

/// Serve the camera channel on stdin/stdout until stdin closes
pub fn serve(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // Without GStreamer the channel still answers, with UNAVAILABLE
    let handler = match gstreamer::init() {
        Ok(()) => Some(Arc::new(CameraHandler::from_config(config))),
        Err(e) => {
            warn!(error = %e, "GStreamer unavailable, camera handler disabled");
            None
        }
    };

    let channel = Arc::new(CameraChannel::new(handler));
    eprintln!("{} ready", channel.name());

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(transport::serve(channel, tokio::io::stdin(), tokio::io::stdout()))?;
    Ok(())
}

/// Get default photo directory
fn get_default_photo_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(DEFAULT_SAVE_FOLDER)
}
