// SPDX-License-Identifier: GPL-3.0-only

//! Full-screen viewer for a single captured item

use crate::errors::{StorageError, ViewerError};
use crate::storage::{MediaItem, MediaKind, MediaStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Reported back to the gallery after a successful delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedMedia {
    pub path: PathBuf,
}

/// One photo or video shown full screen
pub struct MediaViewer {
    store: Arc<dyn MediaStore>,
    item: MediaItem,
}

impl MediaViewer {
    /// Open `path`; fails if it is not an existing file
    pub fn open(store: Arc<dyn MediaStore>, path: &Path) -> Result<Self, ViewerError> {
        let metadata = std::fs::metadata(path)
            .ok()
            .filter(|m| m.is_file())
            .ok_or_else(|| {
                warn!(path = %path.display(), "File not found or invalid path");
                ViewerError::NotFound(path.to_path_buf())
            })?;

        let item = MediaItem::new(path.to_path_buf(), metadata.modified().ok());
        info!(path = %path.display(), kind = %item.kind, "Opening viewer");
        Ok(Self { store, item })
    }

    pub fn item(&self) -> &MediaItem {
        &self.item
    }

    pub fn kind(&self) -> MediaKind {
        self.item.kind
    }

    pub fn path(&self) -> &Path {
        &self.item.path
    }

    /// Delete the shown file
    ///
    /// On failure the viewer stays open on the same item.
    pub fn delete(&self) -> Result<DeletedMedia, StorageError> {
        self.store.remove(&self.item.path)?;
        Ok(DeletedMedia {
            path: self.item.path.clone(),
        })
    }
}

impl std::fmt::Debug for MediaViewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaViewer")
            .field("item", &self.item)
            .finish_non_exhaustive()
    }
}
