// SPDX-License-Identifier: GPL-3.0-only

//! JPEG encoding for filtered stills
//!
//! Output is always baseline JPEG in sRGB (8-bit RGB). Encoding runs in a
//! blocking task.

use super::processing::ProcessedImage;
use crate::constants::encoding::JPEG_QUALITY;
use crate::errors::CameraError;
use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Encoded image data ready to hand back or save
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// JPEG encoder
pub struct PhotoEncoder {
    quality: u8,
}

impl PhotoEncoder {
    /// Create an encoder at the default quality (90)
    pub fn new() -> Self {
        Self {
            quality: JPEG_QUALITY,
        }
    }

    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode a processed image asynchronously
    pub async fn encode(&self, processed: ProcessedImage) -> Result<EncodedImage, CameraError> {
        let ProcessedImage { image, filter } = processed;
        let quality = self.quality();
        debug!(%filter, quality, "Encoding photo");
        tokio::task::spawn_blocking(move || Self::encode_jpeg(&image, quality))
            .await
            .map_err(|e| CameraError::EncodeError(format!("Encoding task error: {}", e)))?
    }

    /// Encode an RGB image as JPEG
    pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<EncodedImage, CameraError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(CameraError::EncodeError("Image has no extent".to_string()));
        }

        let mut buffer = Vec::new();
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        encoder.encode(image.as_raw(), width, height, image::ExtendedColorType::Rgb8)?;

        debug!(size = buffer.len(), quality, "Encoding complete");
        Ok(EncodedImage {
            data: buffer,
            width,
            height,
        })
    }

    /// Write JPEG bytes to `path`, creating its directory
    pub async fn save(data: &[u8], path: &Path) -> Result<PathBuf, std::io::Error> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, data).await?;
        info!(path = %path.display(), bytes = data.len(), "Photo saved");
        Ok(path.to_path_buf())
    }
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new()
    }
}
