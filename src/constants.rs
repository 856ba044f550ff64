// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::path::Path;
use std::time::Duration;

/// Cadence of elapsed-time notifications while recording
pub const RECORDING_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Folder under the user's pictures directory holding captures
pub const DEFAULT_SAVE_FOLDER: &str = "PocketCamera";

/// Store location recordings are registered under
pub const DEFAULT_VIDEO_RELATIVE_PATH: &str = "Movies/PocketCamera";

/// Container written by the virtual camera
pub const DEFAULT_VIDEO_EXTENSION: &str = "mjpeg";

/// File name prefix for stills ("JPEG_<millis>.jpg")
pub const PHOTO_PREFIX: &str = "JPEG_";

/// File name prefix for recordings ("Video_<millis>.<ext>")
pub const VIDEO_PREFIX: &str = "Video_";

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";
pub const MIME_MP4: &str = "video/mp4";
pub const MIME_MJPEG: &str = "video/x-motion-jpeg";
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

/// Extensions treated as video in the gallery
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mjpeg", "mkv", "webm", "mov"];

/// Mime type from the file extension
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => MIME_JPEG,
        "png" => MIME_PNG,
        "mp4" => MIME_MP4,
        "mjpeg" | "mjpg" => MIME_MJPEG,
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => MIME_OCTET_STREAM,
    }
}

/// Name for a new still, stamped with wall-clock milliseconds
pub fn photo_file_name() -> String {
    format!("{}{}.jpg", PHOTO_PREFIX, chrono::Local::now().timestamp_millis())
}

/// Name for a new recording with the given container extension
pub fn video_file_name(extension: &str) -> String {
    format!(
        "{}{}.{}",
        VIDEO_PREFIX,
        chrono::Local::now().timestamp_millis(),
        extension.trim_start_matches('.')
    )
}

/// "MM:SS" display of a recording duration
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type_for(Path::new("a.JPG")), MIME_JPEG);
        assert_eq!(mime_type_for(Path::new("a.mjpeg")), MIME_MJPEG);
        assert_eq!(mime_type_for(Path::new("a")), MIME_OCTET_STREAM);
    }
}
