// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for camera operations
//!
//! This module provides command-line functionality for:
//! - Taking photos and recording videos with the software camera
//! - Listing the gallery
//! - Deleting captured files, singly through the viewer or as a batch

use chrono::{DateTime, Local};
use pocket_camera::app::{Gallery, SessionEvent, TapOutcome};
use pocket_camera::backends::camera::CaptureMode;
use pocket_camera::config::VideoSinkStrategy;
use pocket_camera::constants::format_elapsed;
use pocket_camera::{
    CameraBackendManager, CaptureSessionController, Config, DirectoryMediaStore, Lens,
    PreviewSurface, SessionServices, SessionSettings, VirtualCamera,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// How long to wait for the device to finish writing after a stop
const FINALIZE_TIMEOUT: Duration = Duration::from_secs(10);

const CLI_SURFACE: &str = "cli";

/// Take a photo
pub fn take_photo(config: &Config, lens: Option<Lens>) -> CliResult {
    let rt = Runtime::new()?;
    let (services, mut events) = session_services(config, rt.handle())?;
    let lens = lens.unwrap_or(config.default_lens);

    let settings =
        SessionSettings::from_config(CaptureMode::Photo, PreviewSurface::new(CLI_SURFACE), config);
    let mut controller = CaptureSessionController::new(services, settings, lens);
    controller.bind(lens)?;
    println!("Using camera: {} lens", lens);

    println!("Capturing...");
    controller.capture_still()?;

    let saved = rt.block_on(async {
        while let Some(event) = events.recv().await {
            if let SessionEvent::PhotoSaved(result) = event {
                return Some(result);
            }
        }
        None
    });
    controller.release();

    match saved {
        Some(Ok(path)) => {
            println!("Photo saved: {}", path.display());
            Ok(())
        }
        Some(Err(err)) => Err(err.into()),
        None => Err("Capture ended without a result".into()),
    }
}

/// Record a video for `duration` seconds or until Ctrl+C
pub fn record_video(config: &Config, lens: Option<Lens>, duration: u64) -> CliResult {
    let rt = Runtime::new()?;
    let (services, mut events) = session_services(config, rt.handle())?;
    let lens = lens.unwrap_or(config.default_lens);

    let settings =
        SessionSettings::from_config(CaptureMode::Video, PreviewSurface::new(CLI_SURFACE), config);
    let mut controller = CaptureSessionController::new(services, settings, lens);
    controller.bind(lens)?;
    println!("Using camera: {} lens", lens);

    // Set up Ctrl+C handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = Arc::clone(&stop_flag);
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;

    let output = controller.start_recording()?;
    println!("Output: {}", output.display());
    println!("Duration: {} seconds", duration);
    println!();
    println!("Recording... (press Ctrl+C to stop early)");

    let target = Duration::from_secs(duration);
    let mut finalized = rt.block_on(follow_recording(&mut events, &stop_flag, target));
    println!();

    if !controller.stop_recording() {
        println!("Camera ended the recording");
    }
    if finalized.is_none() {
        finalized = rt.block_on(wait_for(&mut events, |event| match event {
            SessionEvent::RecordingFinalized(result) => Some(result),
            _ => None,
        }));
    }

    let saved = match finalized {
        Some(Ok(path)) => path,
        Some(Err(err)) => {
            controller.release();
            return Err(err.into());
        }
        None => {
            controller.release();
            return Err("Recording did not finalize in time".into());
        }
    };
    println!("Video saved: {}", saved.display());

    if config.video_sink == VideoSinkStrategy::DirectFile {
        let registered = rt.block_on(wait_for(&mut events, |event| match event {
            SessionEvent::MediaRegistered(result) => Some(result),
            _ => None,
        }));
        match registered {
            Some(Ok(record)) => println!("Video copied to store: {}", record.display()),
            Some(Err(err)) => eprintln!("Error copying video to gallery: {}", err),
            None => eprintln!("Video was not copied to the store in time"),
        }
    }

    controller.release();
    Ok(())
}

/// Print elapsed ticks until the target duration, Ctrl+C, or a device finalize
///
/// Returns the finalize result if the device ended the recording itself.
async fn follow_recording(
    events: &mut UnboundedReceiver<SessionEvent>,
    stop_flag: &AtomicBool,
    target: Duration,
) -> Option<Result<PathBuf, pocket_camera::errors::RecordingFinalizeError>> {
    loop {
        if stop_flag.load(Ordering::SeqCst) {
            println!();
            println!("Stopping early...");
            return None;
        }

        match tokio::time::timeout(Duration::from_millis(100), events.recv()).await {
            Ok(Some(SessionEvent::Elapsed(elapsed))) => {
                print!("\rRecording: {}", format_elapsed(elapsed));
                let _ = std::io::stdout().flush();
                if elapsed >= target {
                    return None;
                }
            }
            Ok(Some(SessionEvent::RecordingFinalized(result))) => return Some(result),
            Ok(Some(_)) => {}
            Ok(None) => return None,
            Err(_) => {}
        }
    }
}

async fn wait_for<T>(
    events: &mut UnboundedReceiver<SessionEvent>,
    mut pick: impl FnMut(SessionEvent) -> Option<T>,
) -> Option<T> {
    let wait = async {
        while let Some(event) = events.recv().await {
            if let Some(value) = pick(event) {
                return Some(value);
            }
        }
        None
    };
    tokio::time::timeout(FINALIZE_TIMEOUT, wait).await.ok().flatten()
}

/// List the gallery, newest first
pub fn list_gallery(config: &Config) -> CliResult {
    let gallery = open_gallery(config)?;

    if gallery.items().is_empty() {
        println!("No media in {}", gallery.directory().display());
        return Ok(());
    }

    println!("Media in {}:", gallery.directory().display());
    println!();
    for item in gallery.items() {
        let modified = item
            .modified
            .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<5}  {}  {}", item.kind.label(), modified, item.display_name);
    }
    Ok(())
}

/// Select every path and delete them as one batch
pub fn delete_media(config: &Config, paths: &[PathBuf]) -> CliResult {
    let mut gallery = open_gallery(config)?;

    for (index, path) in paths.iter().enumerate() {
        let path = resolve_item(&gallery, path)?;
        if index == 0 {
            gallery.long_press(&path)?;
        } else if gallery.selection().is_selected(&path) {
            // Listed twice; keep it selected
            continue;
        } else {
            gallery.tap(&path)?;
        }
    }

    let report = gallery.delete_selected();
    for path in &report.deleted {
        println!("Deleted: {}", path.display());
    }
    for failure in &report.failed {
        eprintln!("{}", failure);
    }
    println!("{} item(s) left in gallery", gallery.items().len());

    if report.is_complete() {
        Ok(())
    } else {
        Err(format!("{} file(s) could not be deleted", report.failed.len()).into())
    }
}

/// Show one item; optionally delete it through the viewer
pub fn view_media(config: &Config, path: &Path, delete: bool) -> CliResult {
    let mut gallery = open_gallery(config)?;
    let path = resolve_item(&gallery, path)?;

    let TapOutcome::Open(viewer) = gallery.tap(&path)? else {
        return Err("Gallery is in selection mode".into());
    };

    let item = viewer.item();
    println!("{}: {}", item.kind.label(), item.display_name);
    println!("  Path: {}", item.path.display());
    if let Ok(metadata) = std::fs::metadata(&item.path) {
        println!("  Size: {} bytes", metadata.len());
    }
    if let Some(modified) = item.modified {
        println!(
            "  Modified: {}",
            DateTime::<Local>::from(modified).format("%Y-%m-%d %H:%M:%S")
        );
    }

    if delete {
        match viewer.delete() {
            Ok(deleted) => {
                println!("File deleted");
                gallery.apply_viewer_result(&deleted)?;
                println!("{} item(s) left in gallery", gallery.items().len());
            }
            Err(err) => {
                eprintln!("Failed to delete file");
                return Err(err.into());
            }
        }
    }
    Ok(())
}

fn session_services(
    config: &Config,
    runtime: &Handle,
) -> CliResult<(SessionServices, UnboundedReceiver<SessionEvent>)> {
    let store = DirectoryMediaStore::open(config.media_dir())?;
    let (sender, receiver) = unbounded_channel();

    let services = SessionServices {
        backend: CameraBackendManager::new(Box::new(VirtualCamera::new())),
        store: Arc::new(store),
        observer: Arc::new(sender),
        runtime: runtime.clone(),
    };
    Ok((services, receiver))
}

fn open_gallery(config: &Config) -> CliResult<Gallery> {
    let store = DirectoryMediaStore::open(config.media_dir())?;
    Ok(Gallery::open(Arc::new(store))?)
}

/// Match a user-supplied path against the gallery by full path or file name
fn resolve_item(gallery: &Gallery, path: &Path) -> CliResult<PathBuf> {
    gallery
        .items()
        .iter()
        .find(|item| item.path == path || Path::new(&item.display_name) == path)
        .map(|item| item.path.clone())
        .ok_or_else(|| format!("Not in gallery: {}", path.display()).into())
}
