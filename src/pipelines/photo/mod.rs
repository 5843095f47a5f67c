// SPDX-License-Identifier: GPL-3.0-only

//! Single-shot photo pipeline
//!
//! ```text
//! CaptureAdapter → Post-Processing → Encoding → JPEG bytes
//! ```
//!
//! # Pipeline Stages
//!
//! 1. **Capture**: open a session, settle, take one still, stop the session
//! 2. **Post-Processing**: RGBA→RGB and the filter selected at completion
//! 3. **Encoding**: baseline JPEG at the configured quality

pub mod capture;
pub mod encoding;
pub mod processing;

pub use capture::{CaptureAdapter, CaptureSettings};
pub use encoding::{EncodedImage, PhotoEncoder};
pub use processing::{PostProcessor, ProcessedImage};

use crate::errors::CameraResult;
use crate::filters::FilterSelector;
use tracing::info;

/// Complete photo pipeline
///
/// Orchestrates the capture → process → encode workflow.
pub struct PhotoPipeline {
    capture: CaptureAdapter,
    encoder: PhotoEncoder,
}

impl PhotoPipeline {
    pub fn new(capture: CaptureAdapter, encoder: PhotoEncoder) -> Self {
        Self { capture, encoder }
    }

    /// Capture one photo and encode it as JPEG
    ///
    /// The filter is read from `filters` once the still has arrived, so a
    /// selection made while the shot is in flight still applies to it.
    ///
    /// # Returns
    /// * `Ok(EncodedImage)` - The filtered JPEG
    /// * `Err(CameraError)` - The first stage that failed
    pub async fn take(&self, filters: &FilterSelector) -> CameraResult<EncodedImage> {
        // Stage 1: Capture (session lifetime is scoped to this call)
        let still = self.capture.capture().await?;

        // Stage 2: Post-process (async, CPU-bound)
        let filter = filters.current();
        let processed = PostProcessor::process(still, filter).await?;

        // Stage 3: Encode (async, CPU-bound)
        let encoded = self.encoder.encode(processed).await?;

        info!(
            bytes = encoded.data.len(),
            width = encoded.width,
            height = encoded.height,
            filter = %filter,
            "Photo encoded"
        );
        Ok(encoded)
    }
}
