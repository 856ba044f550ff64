// SPDX-License-Identifier: MPL-2.0

//! Capture pipelines
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────────┐
//! │   Binding    │ ──▶ │  Photo Capture    │ ──▶ │ JPEG in capture  │
//! │ (photo mode) │     │  - target path    │     │ directory        │
//! │              │     │  - await device   │     │                  │
//! └──────────────┘     └───────────────────┘     └──────────────────┘
//!
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────────┐
//! │   Binding    │ ──▶ │ Recording Session │ ──▶ │ Sink (file or    │
//! │ (video mode) │     │  - elapsed ticker │     │ store record)    │
//! │              │     │  - finalize watch │     │ + registration   │
//! └──────────────┘     └───────────────────┘     └──────────────────┘
//! ```
//!
//! Nothing here blocks the caller: device results are awaited on runtime
//! tasks and file copies run on blocking workers.

pub mod photo;
pub mod video;
