// SPDX-License-Identifier: MPL-2.0

//! Video recording session
//!
//! A [`RecordingSession`] owns one in-flight device recording:
//! - the device's stop control
//! - a 1-second elapsed-time ticker
//! - a watcher that reports the device finalize and, for direct-file sinks,
//!   copies the finished file into the media store
//!
//! The ticker and [`RecordingSession::stop`] share a gate lock. A tick is only
//! delivered while holding the gate with the session still active, so once
//! `stop` has returned no further tick can reach the observer.

use crate::app::state::{SessionEvent, SessionObserver};
use crate::backends::camera::{
    Cancelled, Completion, FinalizeResult, RecordingControl, StartedRecording,
};
use crate::constants::RECORDING_TICK_INTERVAL;
use crate::errors::{RecordingFinalizeError, StorageError};
use crate::storage::{MediaSink, MediaStore, register_file};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Recording, ticks flowing
    Active,
    /// Stop requested by the owner; finalize still pending
    Stopped,
    /// Device reported the finalize
    Finalized,
}

#[derive(Debug)]
struct SessionGate {
    phase: Phase,
}

type SharedGate = Arc<Mutex<SessionGate>>;

fn lock(gate: &SharedGate) -> MutexGuard<'_, SessionGate> {
    gate.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Where a direct-file recording is registered after it finalizes
#[derive(Clone)]
pub struct Registration {
    pub store: Arc<dyn MediaStore>,
    pub relative_path: String,
}

/// One in-flight recording
pub struct RecordingSession {
    id: Uuid,
    started_at: Instant,
    sink: MediaSink,
    control: Box<dyn RecordingControl>,
    gate: SharedGate,
    ticker: JoinHandle<()>,
    stop_requested: bool,
}

impl RecordingSession {
    /// Take ownership of a recording the device has just accepted
    ///
    /// `registration` is set for direct-file sinks only; store records are
    /// already visible in the store.
    pub fn start(
        started: StartedRecording,
        sink: MediaSink,
        observer: Arc<dyn SessionObserver>,
        registration: Option<Registration>,
        runtime: &Handle,
    ) -> Self {
        let id = Uuid::new_v4();
        let started_at = Instant::now();
        let gate: SharedGate = Arc::new(Mutex::new(SessionGate {
            phase: Phase::Active,
        }));

        info!(session = %id, sink = %sink.path().display(), "Recording started");

        let ticker = runtime.spawn(run_ticker(
            Arc::clone(&gate),
            Arc::clone(&observer),
            started_at,
        ));

        // Not kept: the finalize is reported even after the session is gone
        runtime.spawn(watch_finalize(
            id,
            started.finalized,
            Arc::clone(&gate),
            observer,
            registration,
        ));

        Self {
            id,
            started_at,
            sink,
            control: started.control,
            gate,
            ticker,
            stop_requested: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sink(&self) -> &MediaSink {
        &self.sink
    }

    /// Time since the recording started
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// False once stopped or finalized by the device
    pub fn is_active(&self) -> bool {
        lock(&self.gate).phase == Phase::Active
    }

    /// Stop ticking and ask the device to finalize
    ///
    /// Returns immediately; the finalize result is reported to the observer.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let device_finalized = {
            let mut gate = lock(&self.gate);
            if gate.phase == Phase::Active {
                gate.phase = Phase::Stopped;
            }
            self.ticker.abort();
            gate.phase == Phase::Finalized
        };

        if !self.stop_requested && !device_finalized {
            info!(
                session = %self.id,
                elapsed_secs = self.elapsed().as_secs(),
                "Stopping recording"
            );
            self.control.stop();
        }
        self.stop_requested = true;
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSession")
            .field("id", &self.id)
            .field("sink", &self.sink)
            .field("active", &self.is_active())
            .finish()
    }
}

async fn run_ticker(gate: SharedGate, observer: Arc<dyn SessionObserver>, started_at: Instant) {
    let mut interval = tokio::time::interval_at(started_at, RECORDING_TICK_INTERVAL);
    loop {
        interval.tick().await;

        let state = lock(&gate);
        if state.phase != Phase::Active {
            break;
        }
        let elapsed = Duration::from_secs(started_at.elapsed().as_secs());
        debug!(elapsed_secs = elapsed.as_secs(), "Recording tick");
        observer.on_event(SessionEvent::Elapsed(elapsed));
    }
}

async fn watch_finalize(
    id: Uuid,
    finalized: Completion<FinalizeResult>,
    gate: SharedGate,
    observer: Arc<dyn SessionObserver>,
    registration: Option<Registration>,
) {
    let outcome = finalized.await;

    let ended_by_device = {
        let mut state = lock(&gate);
        let was_active = state.phase == Phase::Active;
        state.phase = Phase::Finalized;
        was_active
    };
    if ended_by_device {
        warn!(session = %id, "Device ended the recording");
    }

    let result = finalize_result(outcome);
    match &result {
        Ok(path) => info!(session = %id, path = %path.display(), "Recording saved"),
        Err(err) => error!(session = %id, error = %err, "Recording failed"),
    }
    observer.on_event(SessionEvent::RecordingFinalized(result.clone()));

    let (Ok(path), Some(registration)) = (result, registration) else {
        return;
    };

    // Copy off the callback path so later device results are not held up
    let source = path.clone();
    let registered = tokio::task::spawn_blocking(move || {
        register_file(
            registration.store.as_ref(),
            &source,
            &registration.relative_path,
        )
    })
    .await
    .unwrap_or_else(|e| {
        Err(StorageError::Io {
            path,
            message: format!("Task join error: {}", e),
        })
    });

    if let Err(err) = &registered {
        error!(session = %id, error = %err, "Error copying video to gallery");
    }
    observer.on_event(SessionEvent::MediaRegistered(registered));
}

fn finalize_result(
    outcome: Result<FinalizeResult, Cancelled>,
) -> Result<PathBuf, RecordingFinalizeError> {
    match outcome {
        Ok(Ok(path)) => Ok(path),
        Ok(Err(err)) => Err(err.into()),
        Err(cancelled) => Err(cancelled.into()),
    }
}
