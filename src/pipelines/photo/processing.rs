// SPDX-License-Identifier: GPL-3.0-only

//! Post-processing for captured stills
//!
//! Converts the backend's RGBA frame to an RGB image and applies the
//! selected filter. Both steps are CPU-bound and run off the async runtime.

use crate::backends::camera::CapturedStill;
use crate::errors::CameraError;
use crate::filters::FilterType;
use image::RgbImage;
use tracing::{debug, info};

/// Processed image data
pub struct ProcessedImage {
    pub image: RgbImage,
    pub filter: FilterType,
}

/// Post-processor for captured stills
pub struct PostProcessor;

impl PostProcessor {
    /// Convert and filter a still asynchronously
    pub async fn process(still: CapturedStill, filter: FilterType) -> Result<ProcessedImage, CameraError> {
        info!(
            width = still.width,
            height = still.height,
            filter = %filter,
            "Starting post-processing"
        );

        tokio::task::spawn_blocking(move || {
            let rgb = Self::convert_rgba_to_rgb(&still)?;
            let image = filter.apply(&rgb);
            debug!("Post-processing complete");
            Ok(ProcessedImage { image, filter })
        })
        .await
        .map_err(|e| CameraError::CaptureError(format!("Post-processing task error: {}", e)))?
    }

    /// Convert RGBA rows (honoring stride) to an RGB image
    pub fn convert_rgba_to_rgb(still: &CapturedStill) -> Result<RgbImage, CameraError> {
        let width = still.width as usize;
        let height = still.height as usize;
        let stride = still.stride as usize;

        if width == 0 || height == 0 {
            return Err(CameraError::CaptureError("Frame has no extent".to_string()));
        }
        if stride < width * 4 {
            return Err(CameraError::CaptureError(format!(
                "Stride {} too small for width {}",
                stride, width
            )));
        }
        // The last row may omit its padding
        let expected_size = stride * (height - 1) + width * 4;
        if still.data.len() < expected_size {
            return Err(CameraError::CaptureError(format!(
                "RGBA data too small: expected {}, got {}",
                expected_size,
                still.data.len()
            )));
        }

        let mut rgb_data = Vec::with_capacity(width * height * 3);
        for row in 0..height {
            let start = row * stride;
            rgb_data.extend(
                still.data[start..start + width * 4]
                    .chunks_exact(4)
                    .flat_map(|rgba| [rgba[0], rgba[1], rgba[2]]),
            );
        }

        RgbImage::from_raw(still.width, still.height, rgb_data).ok_or_else(|| {
            CameraError::CaptureError("Failed to create RGB image from converted data".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn still(width: u32, height: u32, stride: u32, data: Vec<u8>) -> CapturedStill {
        CapturedStill {
            width,
            height,
            stride,
            data,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_convert_skips_row_padding() {
        // 2x2 frame, 12-byte stride (4 bytes of padding per row)
        let data = vec![
            1, 2, 3, 255, 4, 5, 6, 255, 0, 0, 0, 0, //
            7, 8, 9, 255, 10, 11, 12, 255,
        ];
        let image = PostProcessor::convert_rgba_to_rgb(&still(2, 2, 12, data)).unwrap();
        assert_eq!(image.as_raw(), &vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_empty_frame_is_capture_error() {
        let result = PostProcessor::convert_rgba_to_rgb(&still(4, 4, 16, Vec::new()));
        assert!(matches!(result, Err(CameraError::CaptureError(_))));

        let result = PostProcessor::convert_rgba_to_rgb(&still(0, 0, 0, Vec::new()));
        assert!(matches!(result, Err(CameraError::CaptureError(_))));
    }

    #[tokio::test]
    async fn test_process_keeps_requested_filter() {
        let data = crate::backends::camera::fake::FakeBackend::test_pattern(8, 6);
        let processed = PostProcessor::process(still(8, 6, 32, data), FilterType::Vintage)
            .await
            .unwrap();
        assert_eq!(processed.filter, FilterType::Vintage);
        assert_eq!(processed.image.dimensions(), (8, 6));
    }
}
