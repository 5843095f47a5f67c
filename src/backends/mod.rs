// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for camera access
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               CameraHandler                  │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌─────────────┐    ┌──────────────────┐   │
//! │  │ Permission  │    │     Camera       │   │
//! │  │ (dev/portal)│    │ (V4L2/GStreamer) │   │
//! │  └─────────────┘    └──────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! - [`camera`]: device discovery and single-photo capture sessions
//! - [`permission`]: camera authorization checks and consent requests

pub mod camera;
pub mod permission;
