// SPDX-License-Identifier: MPL-2.0

//! Pocket Camera - capture session core and media gallery
//!
//! This library provides the stateful core of a camera application: binding a
//! camera to a preview surface, taking photos, recording video with an
//! elapsed-time ticker, and a gallery with multi-select deletion.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Capture session controller and gallery screen models
//! - [`backends`]: Camera device abstraction and the software camera
//! - [`pipelines`]: Photo capture and video recording sessions
//! - [`config`]: User configuration handling
//! - [`storage`]: Media store and captured file listing
//!
//! # Example
//!
//! ```ignore
//! let (tx, mut events) = tokio::sync::mpsc::unbounded_channel();
//! let services = SessionServices {
//!     backend: CameraBackendManager::new(Box::new(VirtualCamera::new())),
//!     store: Arc::new(DirectoryMediaStore::open(config.media_dir())?),
//!     observer: Arc::new(tx),
//!     runtime: tokio::runtime::Handle::current(),
//! };
//! let mut controller = CaptureSessionController::new(
//!     services,
//!     SessionSettings::photo(PreviewSurface::new("preview")),
//!     Lens::Back,
//! );
//! controller.bind(Lens::Back)?;
//! controller.capture_still()?;
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use app::{
    CaptureSessionController, Gallery, SelectionModel, SessionEvent, SessionServices,
    SessionSettings,
};
pub use backends::camera::{
    CameraBackendManager, CaptureMode, Lens, PreviewSurface, VirtualCamera,
};
pub use config::Config;
pub use storage::{DirectoryMediaStore, MediaItem, MediaKind, MediaStore};
