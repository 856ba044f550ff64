// SPDX-License-Identifier: GPL-3.0-only

//! Gallery screen model
//!
//! Lists the capture directory newest first and routes gestures:
//! - tap: toggle the item while selecting, otherwise open the viewer
//! - long press: enter or leave selection mode
//! - back: leave selection mode first, then the screen
//!
//! The delete action is only offered while selecting; the mode listener
//! tells the view when that changes.

mod selection;
mod viewer;

pub use selection::{DeleteReport, ModeListener, SelectionModel};
pub use viewer::{DeletedMedia, MediaViewer};

use crate::errors::{AppResult, SelectionError, StorageError};
use crate::storage::{MediaItem, MediaStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// What a tap did
#[derive(Debug)]
pub enum TapOutcome {
    /// Selection mode: membership flipped
    Toggled { selected: bool },
    /// Browse mode: the item opened full screen
    Open(MediaViewer),
}

/// What the back action did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// Selection mode was left; stay on the gallery
    SelectionCleared,
    /// Nothing to undo; leave the gallery
    Leave,
}

pub struct Gallery {
    store: Arc<dyn MediaStore>,
    directory: PathBuf,
    model: SelectionModel,
}

impl Gallery {
    /// List the store's capture directory
    pub fn open(store: Arc<dyn MediaStore>) -> Result<Self, StorageError> {
        let directory = store.capture_dir();
        let mut gallery = Self {
            store,
            directory,
            model: SelectionModel::default(),
        };
        gallery.refresh()?;
        Ok(gallery)
    }

    pub fn set_mode_listener(&mut self, listener: impl FnMut(bool) + Send + 'static) {
        self.model.set_mode_listener(listener);
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn items(&self) -> &[MediaItem] {
        self.model.items()
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.model
    }

    /// Whether the delete action is shown
    pub fn delete_action_visible(&self) -> bool {
        self.model.is_selection_mode()
    }

    /// Re-read the directory; the store lists oldest first
    pub fn refresh(&mut self) -> Result<(), StorageError> {
        let mut items = self.store.list(&self.directory)?;
        items.reverse();
        self.model.replace_collection(items);
        Ok(())
    }

    pub fn tap(&mut self, path: &Path) -> AppResult<TapOutcome> {
        if self.model.is_selection_mode() {
            let selected = self.model.toggle_item(path)?;
            return Ok(TapOutcome::Toggled { selected });
        }
        let viewer = MediaViewer::open(Arc::clone(&self.store), path)?;
        Ok(TapOutcome::Open(viewer))
    }

    /// Returns the new selection mode
    pub fn long_press(&mut self, path: &Path) -> Result<bool, SelectionError> {
        self.model.toggle_selection_mode(path)
    }

    pub fn back(&mut self) -> BackOutcome {
        if self.model.is_selection_mode() {
            self.model.clear_selection();
            BackOutcome::SelectionCleared
        } else {
            BackOutcome::Leave
        }
    }

    /// Delete the selection through the store, then re-list
    pub fn delete_selected(&mut self) -> DeleteReport {
        let store = Arc::clone(&self.store);
        let report = self.model.delete_selected(|item| store.remove(&item.path));
        info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "Deleted selected items"
        );

        if let Err(err) = self.refresh() {
            warn!(error = %err, "Failed to refresh gallery after delete");
        }
        report
    }

    /// Sync with a delete made in the viewer
    ///
    /// The collection changed behind the selection, so it starts over empty.
    pub fn apply_viewer_result(&mut self, deleted: &DeletedMedia) -> Result<(), StorageError> {
        info!(path = %deleted.path.display(), "Viewer deleted item");
        self.model.clear_selection();
        self.refresh()
    }
}

impl std::fmt::Debug for Gallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gallery")
            .field("directory", &self.directory)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
