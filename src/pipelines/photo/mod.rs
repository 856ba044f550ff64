// SPDX-License-Identifier: MPL-2.0

//! Still capture pipeline
//!
//! ```text
//! Binding → capture request → device writes JPEG → PhotoSaved event
//!    ↓
//! Preview continues uninterrupted
//! ```

pub mod capture;

pub use capture::PhotoCapture;
