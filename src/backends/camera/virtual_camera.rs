// SPDX-License-Identifier: GPL-3.0-only

//! Software camera device
//!
//! Renders a lens-tinted test pattern instead of reading a sensor. Stills are
//! encoded as JPEG on a worker thread; recordings write a motion-JPEG stream
//! (concatenated JPEG frames) from a capture thread until stopped.

use super::types::*;
use super::{
    CaptureDevice, Completion, RecordingControl, StartedRecording, StillResult, completion,
};
use crate::storage::MediaSink;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone, PartialEq, Eq)]
struct VirtualCameraConfig {
    lenses: Vec<Lens>,
    permission_granted: bool,
    width: u32,
    height: u32,
    framerate: u32,
}

impl Default for VirtualCameraConfig {
    fn default() -> Self {
        Self {
            lenses: Lens::ALL.to_vec(),
            permission_granted: true,
            width: 320,
            height: 240,
            framerate: 15,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct BoundCamera {
    id: u64,
    lens: Lens,
    mode: CaptureMode,
}

struct ActiveRecording {
    stop_signal: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl ActiveRecording {
    fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Signal the capture thread and wait for it to finish the file
    fn stop_and_join(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take()
            && handle.join().is_err()
        {
            error!("Recording thread panicked");
        }
    }
}

/// Test-pattern camera with a front and a back lens
pub struct VirtualCamera {
    config: VirtualCameraConfig,
    bound: Option<BoundCamera>,
    next_handle_id: u64,
    recording: Option<ActiveRecording>,
}

impl Default for VirtualCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualCamera {
    pub fn new() -> Self {
        Self {
            config: VirtualCameraConfig::default(),
            bound: None,
            next_handle_id: 1,
            recording: None,
        }
    }

    /// Restrict which lenses exist
    #[must_use]
    pub fn with_lenses(mut self, lenses: &[Lens]) -> Self {
        self.config.lenses = lenses.to_vec();
        self
    }

    /// Simulate a granted or denied camera permission
    #[must_use]
    pub fn with_permission(mut self, granted: bool) -> Self {
        self.config.permission_granted = granted;
        self
    }

    #[must_use]
    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width.max(8);
        self.config.height = height.max(8);
        self
    }

    fn check_handle(&self, handle: &DeviceHandle, needed: CaptureMode) -> BackendResult<Lens> {
        let bound = self
            .bound
            .filter(|b| b.id == handle.id())
            .ok_or(BackendError::StaleHandle)?;
        if bound.mode != needed {
            return Err(BackendError::WrongMode(bound.mode));
        }
        Ok(bound.lens)
    }

    fn stop_recording_thread(&mut self) {
        if let Some(mut recording) = self.recording.take() {
            recording.stop_and_join();
        }
    }
}

impl CaptureDevice for VirtualCamera {
    fn bind(&mut self, request: &BindRequest) -> BackendResult<DeviceHandle> {
        if !self.config.permission_granted {
            return Err(BackendError::PermissionDenied);
        }
        if !self.config.lenses.contains(&request.lens) {
            return Err(BackendError::LensNotSupported(request.lens));
        }
        if self.bound.is_some() {
            return Err(BackendError::Busy);
        }

        let id = self.next_handle_id;
        self.next_handle_id += 1;
        self.bound = Some(BoundCamera {
            id,
            lens: request.lens,
            mode: request.mode,
        });

        info!(
            handle = id,
            lens = %request.lens,
            mode = %request.mode,
            surface = %request.surface,
            width = self.config.width,
            height = self.config.height,
            "Virtual camera bound"
        );
        Ok(DeviceHandle::new(id, request.lens, request.mode))
    }

    fn unbind(&mut self, handle: DeviceHandle) {
        if self.bound.is_some_and(|b| b.id == handle.id()) {
            // Unbinding finalizes whatever is still recording
            self.stop_recording_thread();
            self.bound = None;
            debug!(handle = handle.id(), "Virtual camera unbound");
        } else {
            warn!(handle = handle.id(), "Ignoring unbind of stale handle");
        }
    }

    fn live_bindings(&self) -> usize {
        usize::from(self.bound.is_some())
    }

    fn capture_still(&mut self, handle: &DeviceHandle, target: PathBuf) -> Completion<StillResult> {
        let lens = match self.check_handle(handle, CaptureMode::Photo) {
            Ok(lens) => lens,
            Err(err) => return Completion::ready(Err(err)),
        };

        let (completer, completion) = completion();
        let (width, height) = (self.config.width, self.config.height);

        thread::spawn(move || {
            let frame = render_frame(lens, width, height, 0);
            let result = write_jpeg_file(&frame, &target).map(|()| target);
            if let Err(err) = &result {
                error!(error = %err, "Virtual still capture failed");
            }
            completer.complete(result);
        });

        completion
    }

    fn start_recording(
        &mut self,
        handle: &DeviceHandle,
        sink: &MediaSink,
    ) -> BackendResult<StartedRecording> {
        let lens = self.check_handle(handle, CaptureMode::Video)?;
        if self.recording.as_ref().is_some_and(ActiveRecording::is_running) {
            return Err(BackendError::RecordingInProgress);
        }
        // Finished thread from an earlier recording
        self.stop_recording_thread();

        let path = sink.path().to_path_buf();
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        let (completer, finalized) = completion();
        let stop_signal = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop_signal);
        let config = self.config.clone();

        info!(path = %path.display(), lens = %lens, fps = config.framerate, "Virtual recording started");

        let thread_handle = thread::spawn(move || {
            let mut writer = std::io::BufWriter::new(file);
            let frame_interval = Duration::from_secs(1) / config.framerate.max(1);
            let mut frame_index: u32 = 0;

            let result = loop {
                if thread_stop.load(Ordering::SeqCst) {
                    break writer.flush().map_err(BackendError::from);
                }
                let frame = render_frame(lens, config.width, config.height, frame_index);
                if let Err(err) = encode_jpeg(&frame, &mut writer) {
                    break Err(err);
                }
                frame_index = frame_index.wrapping_add(1);
                thread::sleep(frame_interval);
            };

            match &result {
                Ok(()) => debug!(frames = frame_index, "Virtual recording finalized"),
                Err(err) => error!(error = %err, "Virtual recording failed"),
            }
            completer.complete(result.map(|()| path));
        });

        self.recording = Some(ActiveRecording {
            stop_signal: Arc::clone(&stop_signal),
            thread_handle: Some(thread_handle),
        });

        Ok(StartedRecording {
            control: Box::new(VirtualRecordingControl { stop_signal }),
            finalized,
        })
    }
}

impl Drop for VirtualCamera {
    fn drop(&mut self) {
        self.stop_recording_thread();
    }
}

struct VirtualRecordingControl {
    stop_signal: Arc<AtomicBool>,
}

impl RecordingControl for VirtualRecordingControl {
    fn stop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }
}

/// Gradient tinted by lens with a bar that moves with `frame_index`
fn render_frame(lens: Lens, width: u32, height: u32, frame_index: u32) -> RgbImage {
    let tint: [u8; 3] = match lens {
        Lens::Back => [40, 90, 200],
        Lens::Front => [210, 120, 50],
    };
    let bar_x = (frame_index.wrapping_mul(4)) % width;

    RgbImage::from_fn(width, height, |x, y| {
        if x.abs_diff(bar_x) < 4 {
            return Rgb([240, 240, 240]);
        }
        let shade = ((y * 255) / height) as u16;
        Rgb(tint.map(|c| ((u16::from(c) + shade) / 2) as u8))
    })
}

fn encode_jpeg(frame: &RgbImage, writer: &mut impl Write) -> BackendResult<()> {
    JpegEncoder::new_with_quality(writer, JPEG_QUALITY)
        .encode(
            frame.as_raw(),
            frame.width(),
            frame.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| BackendError::Other(format!("JPEG encoding failed: {}", e)))
}

fn write_jpeg_file(frame: &RgbImage, target: &Path) -> BackendResult<()> {
    let file = std::fs::File::create(target)?;
    let mut writer = std::io::BufWriter::new(file);
    encode_jpeg(frame, &mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn request(lens: Lens, mode: CaptureMode) -> BindRequest {
        BindRequest {
            lens,
            mode,
            surface: PreviewSurface::new("test"),
        }
    }

    #[test]
    fn test_bind_rules() {
        let mut camera = VirtualCamera::new().with_lenses(&[Lens::Back]);
        assert_eq!(
            camera.bind(&request(Lens::Front, CaptureMode::Photo)),
            Err(BackendError::LensNotSupported(Lens::Front))
        );

        let handle = camera.bind(&request(Lens::Back, CaptureMode::Photo)).unwrap();
        assert_eq!(camera.live_bindings(), 1);
        assert_eq!(
            camera.bind(&request(Lens::Back, CaptureMode::Photo)),
            Err(BackendError::Busy)
        );

        camera.unbind(handle);
        assert_eq!(camera.live_bindings(), 0);

        let mut denied = VirtualCamera::new().with_permission(false);
        assert_eq!(
            denied.bind(&request(Lens::Back, CaptureMode::Photo)),
            Err(BackendError::PermissionDenied)
        );
    }

    #[test]
    fn test_capture_still_writes_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("JPEG_1.jpg");
        let mut camera = VirtualCamera::new().with_frame_size(32, 24);
        let handle = camera.bind(&request(Lens::Front, CaptureMode::Photo)).unwrap();

        let saved = block_on(camera.capture_still(&handle, target.clone())).unwrap();
        assert_eq!(saved, Ok(target.clone()));

        let bytes = std::fs::read(&target).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        camera.unbind(handle);
    }

    #[test]
    fn test_capture_still_needs_photo_binding() {
        let mut camera = VirtualCamera::new();
        let handle = camera.bind(&request(Lens::Back, CaptureMode::Video)).unwrap();
        let result = block_on(camera.capture_still(&handle, PathBuf::from("unused.jpg"))).unwrap();
        assert_eq!(result, Err(BackendError::WrongMode(CaptureMode::Video)));
        camera.unbind(handle);
    }

    #[test]
    fn test_recording_finalizes_after_stop() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MediaSink::File {
            path: dir.path().join("Video_1.mjpeg"),
        };
        let mut camera = VirtualCamera::new().with_frame_size(16, 16);
        let handle = camera.bind(&request(Lens::Back, CaptureMode::Video)).unwrap();

        let mut started = camera.start_recording(&handle, &sink).unwrap();
        assert_eq!(
            camera.start_recording(&handle, &sink).map(|_| ()),
            Err(BackendError::RecordingInProgress)
        );

        thread::sleep(Duration::from_millis(100));
        started.control.stop();
        let finalized = block_on(started.finalized).unwrap();
        assert_eq!(finalized, Ok(sink.path().to_path_buf()));
        assert!(std::fs::metadata(sink.path()).unwrap().len() > 0);

        camera.unbind(handle);
    }

    #[test]
    fn test_unbind_finalizes_recording() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MediaSink::File {
            path: dir.path().join("Video_2.mjpeg"),
        };
        let mut camera = VirtualCamera::new().with_frame_size(16, 16);
        let handle = camera.bind(&request(Lens::Back, CaptureMode::Video)).unwrap();
        let started = camera.start_recording(&handle, &sink).unwrap();

        camera.unbind(handle);
        assert_eq!(block_on(started.finalized), Ok(Ok(sink.path().to_path_buf())));
    }
}
