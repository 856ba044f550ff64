// SPDX-License-Identifier: MPL-2.0

//! Shared fixtures for integration tests

#![allow(dead_code)]

use pocket_camera::app::{CaptureSessionController, SessionEvent, SessionServices, SessionSettings};
use pocket_camera::backends::camera::{
    BackendError, BackendResult, BindRequest, CameraBackendManager, CaptureDevice, Completer,
    Completion, DeviceHandle, FinalizeResult, Lens, PreviewSurface, RecordingControl,
    StartedRecording, StillResult, completion,
};
use pocket_camera::storage::{DirectoryMediaStore, MediaSink};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

/// Bytes the mock device writes into every recording sink
pub const MOCK_VIDEO_BYTES: &[u8] = b"mock video frames";

/// Device calls in the order they happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    Bind(Lens),
    Unbind(Lens),
    CaptureStill,
    StartRecording(PathBuf),
    StopRecording,
}

#[derive(Default)]
struct MockState {
    calls: Vec<DeviceCall>,
    live: usize,
    max_live: usize,
    next_id: u64,
    fail_bind: Option<BackendError>,
    fail_start: Option<BackendError>,
    pending_stills: Vec<Completer<StillResult>>,
    pending_finalize: Vec<Completer<FinalizeResult>>,
    stops: usize,
}

/// Scriptable [`CaptureDevice`]
///
/// Never refuses a second bind, so a double bind shows up in `max_live`.
pub struct MockDevice {
    state: Arc<Mutex<MockState>>,
}

/// Test-side view of a [`MockDevice`]
#[derive(Clone)]
pub struct MockControl {
    state: Arc<Mutex<MockState>>,
}

pub fn mock_device() -> (MockDevice, MockControl) {
    let state = Arc::new(Mutex::new(MockState::default()));
    (
        MockDevice {
            state: Arc::clone(&state),
        },
        MockControl { state },
    )
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap()
}

impl CaptureDevice for MockDevice {
    fn bind(&mut self, request: &BindRequest) -> BackendResult<DeviceHandle> {
        let mut state = lock(&self.state);
        if let Some(err) = state.fail_bind.take() {
            return Err(err);
        }
        state.calls.push(DeviceCall::Bind(request.lens));
        state.live += 1;
        state.max_live = state.max_live.max(state.live);
        state.next_id += 1;
        Ok(DeviceHandle::new(state.next_id, request.lens, request.mode))
    }

    fn unbind(&mut self, handle: DeviceHandle) {
        let mut state = lock(&self.state);
        state.calls.push(DeviceCall::Unbind(handle.lens()));
        state.live -= 1;
    }

    fn live_bindings(&self) -> usize {
        lock(&self.state).live
    }

    fn capture_still(&mut self, _handle: &DeviceHandle, _target: PathBuf) -> Completion<StillResult> {
        let (completer, completion) = completion();
        let mut state = lock(&self.state);
        state.calls.push(DeviceCall::CaptureStill);
        state.pending_stills.push(completer);
        completion
    }

    fn start_recording(
        &mut self,
        _handle: &DeviceHandle,
        sink: &MediaSink,
    ) -> BackendResult<StartedRecording> {
        let mut state = lock(&self.state);
        if let Some(err) = state.fail_start.take() {
            return Err(err);
        }
        std::fs::write(sink.path(), MOCK_VIDEO_BYTES)?;
        state
            .calls
            .push(DeviceCall::StartRecording(sink.path().to_path_buf()));

        let (completer, finalized) = completion();
        state.pending_finalize.push(completer);
        Ok(StartedRecording {
            control: Box::new(MockRecordingControl {
                state: Arc::clone(&self.state),
            }),
            finalized,
        })
    }
}

struct MockRecordingControl {
    state: Arc<Mutex<MockState>>,
}

impl RecordingControl for MockRecordingControl {
    fn stop(&mut self) {
        let mut state = lock(&self.state);
        state.calls.push(DeviceCall::StopRecording);
        state.stops += 1;
    }
}

impl MockControl {
    pub fn calls(&self) -> Vec<DeviceCall> {
        lock(&self.state).calls.clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }

    pub fn live(&self) -> usize {
        lock(&self.state).live
    }

    pub fn max_live(&self) -> usize {
        lock(&self.state).max_live
    }

    pub fn stops(&self) -> usize {
        lock(&self.state).stops
    }

    pub fn fail_next_bind(&self, err: BackendError) {
        lock(&self.state).fail_bind = Some(err);
    }

    pub fn fail_next_start(&self, err: BackendError) {
        lock(&self.state).fail_start = Some(err);
    }

    /// Resolve the oldest pending still capture
    pub fn complete_still(&self, result: StillResult) {
        let completer = lock(&self.state).pending_stills.remove(0);
        completer.complete(result);
    }

    /// Resolve the oldest pending recording finalize
    pub fn finish_recording(&self, result: FinalizeResult) {
        let completer = lock(&self.state).pending_finalize.remove(0);
        completer.complete(result);
    }

    pub fn pending_finalizes(&self) -> usize {
        lock(&self.state).pending_finalize.len()
    }
}

/// A controller wired to a mock device and a temporary store
pub struct Harness {
    pub controller: CaptureSessionController,
    pub device: MockControl,
    pub events: UnboundedReceiver<SessionEvent>,
    pub store: Arc<DirectoryMediaStore>,
    pub dir: TempDir,
}

/// Must be called from inside a tokio runtime
pub fn harness(settings: SessionSettings) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(DirectoryMediaStore::open(dir.path().join("media")).unwrap());
    let (device, control) = mock_device();
    let (sender, events) = unbounded_channel();

    let services = SessionServices {
        backend: CameraBackendManager::new(Box::new(device)),
        store: store.clone(),
        observer: Arc::new(sender),
        runtime: tokio::runtime::Handle::current(),
    };

    Harness {
        controller: CaptureSessionController::new(services, settings, Lens::Back),
        device: control,
        events,
        store,
        dir,
    }
}

pub fn photo_settings() -> SessionSettings {
    SessionSettings::photo(PreviewSurface::new("viewfinder"))
}

pub fn video_settings() -> SessionSettings {
    SessionSettings::video(PreviewSurface::new("viewfinder"))
}

/// Next event matching `pick`, skipping others
pub async fn wait_for<T>(
    events: &mut UnboundedReceiver<SessionEvent>,
    mut pick: impl FnMut(SessionEvent) -> Option<T>,
) -> T {
    let wait = async {
        loop {
            let event = events.recv().await.expect("observer channel closed");
            if let Some(value) = pick(event) {
                return value;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(10), wait)
        .await
        .expect("timed out waiting for session event")
}

/// Elapsed ticks already queued, in order
pub fn drain_elapsed(events: &mut UnboundedReceiver<SessionEvent>) -> Vec<Duration> {
    let mut ticks = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::Elapsed(elapsed) = event {
            ticks.push(elapsed);
        }
    }
    ticks
}
