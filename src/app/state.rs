// SPDX-License-Identifier: GPL-3.0-only

//! Session state types and the events a session reports

use crate::errors::{CaptureError, RecordingFinalizeError, StorageError};
use std::path::PathBuf;
use std::time::Duration;

/// Recording state as seen by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// Not recording
    #[default]
    Idle,
    /// Actively recording
    Recording,
}

impl RecordingState {
    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Recording)
    }
}

/// Binding state of a session controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingState {
    #[default]
    Unbound,
    Bound,
}

/// Asynchronous results and notifications from a capture session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A still capture finished
    PhotoSaved(Result<PathBuf, CaptureError>),
    /// Whole seconds since the recording started
    Elapsed(Duration),
    /// The device finalized a recording
    RecordingFinalized(Result<PathBuf, RecordingFinalizeError>),
    /// A direct-file recording was copied into the media store
    MediaRegistered(Result<PathBuf, StorageError>),
}

/// Receiver of [`SessionEvent`]s
///
/// Called from runtime worker tasks, never from inside a controller method.
/// Implementations must not block.
pub trait SessionObserver: Send + Sync {
    fn on_event(&self, event: SessionEvent);
}

impl SessionObserver for tokio::sync::mpsc::UnboundedSender<SessionEvent> {
    fn on_event(&self, event: SessionEvent) {
        // Receiver gone means the screen is gone; nothing left to tell
        let _ = self.send(event);
    }
}
