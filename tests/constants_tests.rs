// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use pocket_camera::constants::{
    PHOTO_PREFIX, RECORDING_TICK_INTERVAL, VIDEO_PREFIX, format_elapsed, mime_type_for,
    photo_file_name, video_file_name,
};
use std::path::Path;
use std::time::Duration;

#[test]
fn test_tick_interval_is_one_second() {
    assert_eq!(RECORDING_TICK_INTERVAL, Duration::from_secs(1));
}

#[test]
fn test_elapsed_display() {
    // Timer shows minutes and seconds, zero padded
    assert_eq!(format_elapsed(Duration::ZERO), "00:00");
    assert_eq!(format_elapsed(Duration::from_millis(59_999)), "00:59");
    assert_eq!(format_elapsed(Duration::from_secs(61)), "01:01");
    assert_eq!(format_elapsed(Duration::from_secs(3600)), "60:00");
}

#[test]
fn test_capture_file_names() {
    let photo = photo_file_name();
    assert!(photo.starts_with(PHOTO_PREFIX));
    assert!(photo.ends_with(".jpg"));

    let video = video_file_name(".mp4");
    assert!(video.starts_with(VIDEO_PREFIX));
    assert!(video.ends_with(".mp4"));
    assert!(!video.contains(".."), "Leading dot should not be doubled");
}

#[test]
fn test_mime_types_follow_extension() {
    assert_eq!(mime_type_for(Path::new("JPEG_1.JPG")), "image/jpeg");
    assert_eq!(mime_type_for(Path::new("Video_1.mp4")), "video/mp4");
    assert_eq!(mime_type_for(Path::new("notes")), "application/octet-stream");
}
