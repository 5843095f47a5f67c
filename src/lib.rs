// SPDX-License-Identifier: GPL-3.0-only

//! Photobooth - a single-shot camera bridge for desktop GUI hosts
//!
//! This library checks and requests camera permission, captures one still
//! per call, applies one of a fixed set of filters and returns JPEG bytes
//! over a named method channel.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Camera and permission backend abstraction
//! - [`filters`]: Filter names and their transform chains
//! - [`pipelines`]: Capture, post-processing and encoding
//! - [`handler`]: The owned state answering host calls
//! - [`channel`]: Method dispatch and the stdio transport
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! let handler = Arc::new(CameraHandler::from_config(&Config::default()));
//! let channel = CameraChannel::new(Some(handler));
//! let result = channel.handle(MethodCall::new("takePicture", None)).await;
//! ```

pub mod backends;
pub mod channel;
pub mod config;
pub mod constants;
pub mod errors;
pub mod filters;
pub mod handler;
pub mod pipelines;

// Re-export commonly used types
pub use channel::{CameraChannel, MethodCall, MethodResult};
pub use config::Config;
pub use errors::{CameraError, CameraResult, ErrorCode};
pub use filters::{FilterSelector, FilterType};
pub use handler::CameraHandler;
