// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! ```text
//! ┌──────────────────────────┐
//! │ CaptureSessionController │  ← capture/record state machine
//! └────────────┬─────────────┘
//!              │
//!              ▼
//! ┌──────────────────────────┐
//! │   CameraBackendManager   │  ← shared ownership, scoped bindings
//! └────────────┬─────────────┘
//!              │
//!              ▼
//! ┌──────────────────────────┐
//! │   CaptureDevice trait    │  ← common interface
//! └────────────┬─────────────┘
//!              │
//!              ▼
//!       ┌─────────────┐
//!       │VirtualCamera│  ← software implementation
//!       └─────────────┘
//! ```

pub mod completion;
pub mod manager;
pub mod types;
pub mod virtual_camera;

pub use completion::{Cancelled, Completer, Completion, completion};
pub use manager::{Binding, CameraBackendManager};
pub use types::*;
pub use virtual_camera::VirtualCamera;

use crate::storage::MediaSink;
use std::path::PathBuf;

/// Result of a still capture as reported by the device
pub type StillResult = BackendResult<PathBuf>;

/// Result of a recording finalize as reported by the device
pub type FinalizeResult = BackendResult<PathBuf>;

/// Camera device trait
///
/// A device holds at most one binding at a time; binding again while a
/// handle is live is an error (`BackendError::Busy`), never an implicit
/// rebind. Callers are expected to go through [`CameraBackendManager`],
/// which guarantees every handle is given back.
pub trait CaptureDevice: Send {
    // ===== Lifecycle =====

    /// Attach the camera facing `request.lens` to the preview surface with
    /// the use case for `request.mode`
    fn bind(&mut self, request: &BindRequest) -> BackendResult<DeviceHandle>;

    /// Release a binding. Stale handles are ignored.
    fn unbind(&mut self, handle: DeviceHandle);

    /// Number of bindings the device currently holds
    fn live_bindings(&self) -> usize;

    // ===== Capture: Photo =====

    /// Start writing a still image to `target`
    ///
    /// Returns as soon as the request is queued; the written path (or the
    /// failure) arrives through the completion.
    fn capture_still(&mut self, handle: &DeviceHandle, target: PathBuf) -> Completion<StillResult>;

    // ===== Capture: Video =====

    /// Start recording into `sink`
    ///
    /// The returned completion resolves when the recording is finalized,
    /// either after [`RecordingControl::stop`] or because the device ended
    /// it on its own (fatal error).
    fn start_recording(
        &mut self,
        handle: &DeviceHandle,
        sink: &MediaSink,
    ) -> BackendResult<StartedRecording>;
}

/// Control side of an in-flight device recording
pub trait RecordingControl: Send {
    /// Request the device to finalize. Idempotent; never blocks on the
    /// finalize itself.
    fn stop(&mut self);
}

/// A recording the device has accepted
pub struct StartedRecording {
    pub control: Box<dyn RecordingControl>,
    pub finalized: Completion<FinalizeResult>,
}

impl std::fmt::Debug for StartedRecording {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartedRecording").finish_non_exhaustive()
    }
}
