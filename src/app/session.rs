// SPDX-License-Identifier: GPL-3.0-only

//! Capture session controller
//!
//! One controller per capture screen. It owns the screen's camera binding
//! and, in video mode, the in-flight recording:
//!
//! ```text
//!   UNBOUND ──bind/switch_lens──▶ BOUND ──start_recording──▶ BOUND+RECORDING
//!      ▲                            │  ◀──stop_recording / device finalize──┘
//!      └──────────release───────────┘
//! ```
//!
//! Every rebind releases first, so the device never holds two bindings for
//! one controller. Dropping the controller releases.

use crate::app::state::{BindingState, RecordingState, SessionEvent, SessionObserver};
use crate::backends::camera::{
    BindRequest, Binding, CameraBackendManager, CaptureMode, Lens, PreviewSurface,
};
use crate::config::{Config, VideoSinkStrategy};
use crate::constants::{DEFAULT_VIDEO_EXTENSION, DEFAULT_VIDEO_RELATIVE_PATH, video_file_name};
use crate::errors::{CaptureError, DeviceBindError, RecordingStartError};
use crate::pipelines::photo::PhotoCapture;
use crate::pipelines::video::{RecordingSession, Registration};
use crate::storage::{MediaSink, MediaStore, NewMediaEntry, reserve_path};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{error, info, warn};

/// Collaborators a controller works with
#[derive(Clone)]
pub struct SessionServices {
    pub backend: CameraBackendManager,
    pub store: Arc<dyn MediaStore>,
    pub observer: Arc<dyn SessionObserver>,
    /// Runtime that device results and the elapsed ticker run on
    pub runtime: Handle,
}

/// Per-screen settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub mode: CaptureMode,
    pub surface: PreviewSurface,
    pub video_sink: VideoSinkStrategy,
    pub video_relative_path: String,
    pub video_extension: String,
}

impl SessionSettings {
    pub fn photo(surface: PreviewSurface) -> Self {
        Self::new(CaptureMode::Photo, surface)
    }

    pub fn video(surface: PreviewSurface) -> Self {
        Self::new(CaptureMode::Video, surface)
    }

    fn new(mode: CaptureMode, surface: PreviewSurface) -> Self {
        Self {
            mode,
            surface,
            video_sink: VideoSinkStrategy::default(),
            video_relative_path: DEFAULT_VIDEO_RELATIVE_PATH.to_string(),
            video_extension: DEFAULT_VIDEO_EXTENSION.to_string(),
        }
    }

    /// Settings for `mode` with the recording options from the user config
    pub fn from_config(mode: CaptureMode, surface: PreviewSurface, config: &Config) -> Self {
        Self {
            mode,
            surface,
            video_sink: config.video_sink,
            video_relative_path: config.video_relative_path.clone(),
            video_extension: config.video_extension.clone(),
        }
    }

    pub fn with_video_sink(mut self, video_sink: VideoSinkStrategy) -> Self {
        self.video_sink = video_sink;
        self
    }
}

/// Camera binding and capture/record state machine for one screen
///
/// All operations take `&mut self`: a controller is driven from one logical
/// thread. Asynchronous results go to the [`SessionObserver`].
pub struct CaptureSessionController {
    services: SessionServices,
    settings: SessionSettings,
    lens: Lens,
    binding: Option<Binding>,
    recording: Option<RecordingSession>,
}

impl CaptureSessionController {
    /// A new, unbound controller preferring `lens`
    pub fn new(services: SessionServices, settings: SessionSettings, lens: Lens) -> Self {
        Self {
            services,
            settings,
            lens,
            binding: None,
            recording: None,
        }
    }

    pub fn mode(&self) -> CaptureMode {
        self.settings.mode
    }

    /// Current lens; updated by every bind attempt, successful or not
    pub fn lens(&self) -> Lens {
        self.lens
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn binding_state(&self) -> BindingState {
        if self.is_bound() {
            BindingState::Bound
        } else {
            BindingState::Unbound
        }
    }

    /// Idle as soon as a stop is requested or the device ends the recording
    pub fn recording_state(&self) -> RecordingState {
        if self.active_recording().is_some() {
            RecordingState::Recording
        } else {
            RecordingState::Idle
        }
    }

    /// Time since the current recording started
    pub fn recording_elapsed(&self) -> Option<Duration> {
        self.active_recording().map(RecordingSession::elapsed)
    }

    fn active_recording(&self) -> Option<&RecordingSession> {
        self.recording.as_ref().filter(|session| session.is_active())
    }

    /// Bind the camera facing `lens`, releasing any current binding first
    ///
    /// On failure the controller stays unbound; retrying is up to the caller.
    pub fn bind(&mut self, lens: Lens) -> Result<(), DeviceBindError> {
        self.release();
        self.lens = lens;

        let request = BindRequest {
            lens,
            mode: self.settings.mode,
            surface: self.settings.surface.clone(),
        };
        match self.services.backend.bind(&request) {
            Ok(binding) => {
                self.binding = Some(binding);
                Ok(())
            }
            Err(err) => {
                let err = DeviceBindError::from(err);
                error!(lens = %lens, error = %err, "Camera initialization failed");
                Err(err)
            }
        }
    }

    /// Rebind at `lens`; binds fresh when unbound
    pub fn switch_lens(&mut self, lens: Lens) -> Result<(), DeviceBindError> {
        info!(from = %self.lens, to = %lens, "Switching lens");
        self.bind(lens)
    }

    /// Switch to the opposite lens
    pub fn toggle_lens(&mut self) -> Result<(), DeviceBindError> {
        self.switch_lens(self.lens.toggled())
    }

    /// Request a still capture
    ///
    /// Returns the destination path once the request is queued; the outcome
    /// arrives as [`SessionEvent::PhotoSaved`].
    pub fn capture_still(&mut self) -> Result<PathBuf, CaptureError> {
        if self.settings.mode != CaptureMode::Photo {
            return Err(CaptureError::WrongMode(self.settings.mode));
        }
        let binding = self.binding.as_ref().ok_or(CaptureError::NotBound)?;

        let target = PhotoCapture::target_path(self.services.store.as_ref())?;
        let completion = PhotoCapture::request(binding, target.clone());

        let observer = Arc::clone(&self.services.observer);
        let reserved = target.clone();
        self.services.runtime.spawn(async move {
            let result = PhotoCapture::finish(completion, &reserved).await;
            observer.on_event(SessionEvent::PhotoSaved(result));
        });
        Ok(target)
    }

    /// Start a recording; returns the sink path
    ///
    /// Elapsed time is reported every second until the recording stops.
    pub fn start_recording(&mut self) -> Result<PathBuf, RecordingStartError> {
        if self.settings.mode != CaptureMode::Video {
            return Err(RecordingStartError::WrongMode(self.settings.mode));
        }
        self.reap_finished_recording();

        let binding = self.binding.as_ref().ok_or(RecordingStartError::NotBound)?;
        if self.recording.is_some() {
            warn!("Recording already in progress");
            return Err(RecordingStartError::AlreadyRecording);
        }

        let sink = self.allocate_sink()?;
        let started = match binding.start_recording(&sink) {
            Ok(started) => started,
            Err(err) => {
                error!(error = %err, "Failed to start recording");
                self.discard_sink(&sink);
                return Err(err.into());
            }
        };

        let registration = match &sink {
            MediaSink::File { .. } => Some(Registration {
                store: Arc::clone(&self.services.store),
                relative_path: self.settings.video_relative_path.clone(),
            }),
            MediaSink::Record { .. } => None,
        };

        let path = sink.path().to_path_buf();
        self.recording = Some(RecordingSession::start(
            started,
            sink,
            Arc::clone(&self.services.observer),
            registration,
            &self.services.runtime,
        ));
        Ok(path)
    }

    /// Stop the current recording
    ///
    /// Idle on return; the finalize is reported later as
    /// [`SessionEvent::RecordingFinalized`]. Returns false if nothing was
    /// recording.
    pub fn stop_recording(&mut self) -> bool {
        let Some(session) = self.recording.take() else {
            return false;
        };
        let was_active = session.is_active();
        session.stop();
        was_active
    }

    /// Stop any recording and unbind. No-op when already unbound.
    pub fn release(&mut self) {
        self.stop_recording();
        if let Some(binding) = self.binding.take() {
            info!(lens = %self.lens, "Releasing camera");
            binding.release();
        }
    }

    /// Forget a session the device already finalized on its own
    fn reap_finished_recording(&mut self) {
        if self.recording.as_ref().is_some_and(|s| !s.is_active()) {
            self.recording = None;
        }
    }

    fn allocate_sink(&self) -> Result<MediaSink, RecordingStartError> {
        let name = video_file_name(&self.settings.video_extension);
        let store = self.services.store.as_ref();

        match self.settings.video_sink {
            VideoSinkStrategy::DirectFile => {
                let dir = store.capture_dir();
                let path = std::fs::create_dir_all(&dir)
                    .and_then(|_| reserve_path(&dir, &name))
                    .map_err(|e| RecordingStartError::SinkUnavailable(e.to_string()))?;
                Ok(MediaSink::File { path })
            }
            VideoSinkStrategy::StoreRecord => {
                let entry =
                    NewMediaEntry::for_file(Path::new(&name), &self.settings.video_relative_path);
                store
                    .insert(&entry)
                    .map_err(|e| RecordingStartError::SinkUnavailable(e.to_string()))
            }
        }
    }

    /// Remove a reserved file or record the device never wrote to
    fn discard_sink(&self, sink: &MediaSink) {
        let path = sink.path();
        if let Err(err) = self.services.store.remove(path) {
            warn!(path = %path.display(), error = %err, "Failed to discard unused media record");
        }
    }
}

impl Drop for CaptureSessionController {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for CaptureSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSessionController")
            .field("mode", &self.settings.mode)
            .field("lens", &self.lens)
            .field("binding", &self.binding)
            .field("recording", &self.recording)
            .finish()
    }
}
