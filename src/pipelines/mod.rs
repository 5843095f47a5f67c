// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines for still capture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │   Session    │ ──▶ │  Photo Pipeline   │ ──▶ │  JPEG bytes  │
//! │   (RGBA)     │     │  - RGBA→RGB       │     │              │
//! │              │     │  - Filter         │     │              │
//! │              │     │  - Encoding       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! - [`photo`]: single-shot capture, filtering and JPEG encoding

pub mod photo;
