// SPDX-License-Identifier: MPL-2.0

//! Photo capture through the camera backend
//!
//! Stills are written by the device straight into the capture directory,
//! which is what the gallery lists, so a saved photo is visible without a
//! separate registration step.
//!
//! The destination is reserved as an empty file before the request goes
//! out; a failed capture removes it again.

use crate::backends::camera::{Binding, Completion, StillResult};
use crate::constants::photo_file_name;
use crate::errors::CaptureError;
use crate::storage::{MediaStore, reserve_path};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Photo capture handler
pub struct PhotoCapture;

impl PhotoCapture {
    /// Reserve a fresh destination in the store's capture directory
    pub fn target_path(store: &dyn MediaStore) -> Result<PathBuf, CaptureError> {
        let dir = store.capture_dir();
        std::fs::create_dir_all(&dir)
            .and_then(|_| reserve_path(&dir, &photo_file_name()))
            .map_err(|e| {
                error!(path = %dir.display(), error = %e, "Failed to create photo file");
                CaptureError::Storage(e.to_string())
            })
    }

    /// Queue a capture on the binding
    pub fn request(binding: &Binding, target: PathBuf) -> Completion<StillResult> {
        debug!(target = %target.display(), "Requesting still capture");
        binding.capture_still(target)
    }

    /// Wait for the device and translate its result
    ///
    /// On failure the reserved `target` is removed unless the device wrote
    /// something into it.
    pub async fn finish(
        completion: Completion<StillResult>,
        target: &Path,
    ) -> Result<PathBuf, CaptureError> {
        let result = match completion.await {
            Ok(Ok(path)) => Ok(path),
            Ok(Err(err)) => Err(CaptureError::from(err)),
            Err(_) => Err(CaptureError::Failed(
                "capture abandoned by the device".to_string(),
            )),
        };

        match &result {
            Ok(path) => info!(path = %path.display(), "The image has been saved"),
            Err(err) => {
                error!(error = %err, "Error taking photo");
                discard_placeholder(target);
            }
        }
        result
    }
}

fn discard_placeholder(target: &Path) {
    let empty = std::fs::metadata(target).is_ok_and(|m| m.is_file() && m.len() == 0);
    if empty && let Err(e) = std::fs::remove_file(target) {
        warn!(path = %target.display(), error = %e, "Failed to remove unused photo file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::{BackendError, completion};

    #[tokio::test]
    async fn test_finish_maps_device_failure() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("JPEG_1.jpg");
        std::fs::File::create_new(&target).unwrap();

        let result =
            PhotoCapture::finish(Completion::ready(Err(BackendError::Busy)), &target).await;
        assert_eq!(result, Err(CaptureError::Failed("Camera is busy".to_string())));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_finish_reports_abandoned_capture() {
        let (completer, pending) = completion::<StillResult>();
        drop(completer);
        assert!(matches!(
            PhotoCapture::finish(pending, Path::new("never-created.jpg")).await,
            Err(CaptureError::Failed(_))
        ));
    }

    #[test]
    fn test_target_path_is_in_capture_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = crate::storage::DirectoryMediaStore::open(dir.path().join("media")).unwrap();
        let target = PhotoCapture::target_path(&store).unwrap();
        assert_eq!(target.parent(), Some(dir.path().join("media").as_path()));
        assert_eq!(target.extension().and_then(|e| e.to_str()), Some("jpg"));
        assert!(target.is_file());

        let next = PhotoCapture::target_path(&store).unwrap();
        assert_ne!(next, target);
    }
}
