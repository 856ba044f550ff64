// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend lifecycle manager
//!
//! The manager provides:
//! - Thread-safe shared access to the capture device
//! - Scoped bindings: a [`Binding`] gives its handle back to the device when
//!   dropped, on every exit path

use super::types::*;
use super::{CaptureDevice, Completion, StartedRecording, StillResult};
use crate::storage::MediaSink;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Camera backend manager
///
/// Cheap to clone; all clones share one device.
#[derive(Clone)]
pub struct CameraBackendManager {
    device: Arc<Mutex<Box<dyn CaptureDevice>>>,
}

impl CameraBackendManager {
    /// Wrap a device
    pub fn new(device: Box<dyn CaptureDevice>) -> Self {
        Self {
            device: Arc::new(Mutex::new(device)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn CaptureDevice>> {
        // A panic inside a device call must not wedge every later unbind
        self.device.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire a binding
    pub fn bind(&self, request: &BindRequest) -> BackendResult<Binding> {
        info!(request = %request, "Binding camera");

        let handle = self.lock().bind(request)?;
        debug!(handle = handle.id(), "Camera bound");

        Ok(Binding {
            manager: self.clone(),
            handle: Some(handle),
        })
    }

    /// Number of bindings the device currently holds
    pub fn live_bindings(&self) -> usize {
        self.lock().live_bindings()
    }

    fn unbind(&self, handle: DeviceHandle) {
        info!(handle = handle.id(), lens = %handle.lens(), "Unbinding camera");
        self.lock().unbind(handle);
    }
}

impl std::fmt::Debug for CameraBackendManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraBackendManager")
            .field("live_bindings", &self.live_bindings())
            .finish()
    }
}

/// A live device binding
///
/// Owning-resource wrapper around a [`DeviceHandle`]; dropping it unbinds.
pub struct Binding {
    manager: CameraBackendManager,
    handle: Option<DeviceHandle>,
}

impl Binding {
    pub fn lens(&self) -> Option<Lens> {
        self.handle.as_ref().map(DeviceHandle::lens)
    }

    /// Queue a still capture on this binding
    pub fn capture_still(&self, target: PathBuf) -> Completion<StillResult> {
        match &self.handle {
            Some(handle) => self.manager.lock().capture_still(handle, target),
            None => Completion::ready(Err(BackendError::StaleHandle)),
        }
    }

    /// Start a device recording on this binding
    pub fn start_recording(&self, sink: &MediaSink) -> BackendResult<StartedRecording> {
        let handle = self.handle.as_ref().ok_or(BackendError::StaleHandle)?;
        self.manager.lock().start_recording(handle, sink)
    }

    /// Unbind now instead of at end of scope
    pub fn release(mut self) {
        self.give_back();
    }

    fn give_back(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.manager.unbind(handle);
        }
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        if self.handle.is_some() {
            warn!("Binding dropped without explicit release, unbinding");
        }
        self.give_back();
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("handle", &self.handle)
            .finish()
    }
}
