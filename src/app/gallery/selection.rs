// SPDX-License-Identifier: GPL-3.0-only

//! Multi-select state over the gallery collection

use crate::errors::{SelectionDeleteError, SelectionError, StorageError};
use crate::storage::MediaItem;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Selection mode and its members as one value
///
/// Members can only exist while selecting; leaving the mode drops them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Selection {
    #[default]
    Inactive,
    Active(HashSet<PathBuf>),
}

/// Called with the new mode whenever selection mode actually flips
pub type ModeListener = Box<dyn FnMut(bool) + Send>;

/// Outcome of [`SelectionModel::delete_selected`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// Removed from the collection
    pub deleted: Vec<PathBuf>,
    /// Still in the collection
    pub failed: Vec<SelectionDeleteError>,
}

impl DeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Newest-first collection with a toggleable selection mode
#[derive(Default)]
pub struct SelectionModel {
    items: Vec<MediaItem>,
    selection: Selection,
    mode_listener: Option<ModeListener>,
}

impl SelectionModel {
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mode_listener(mut self, listener: impl FnMut(bool) + Send + 'static) -> Self {
        self.mode_listener = Some(Box::new(listener));
        self
    }

    pub fn set_mode_listener(&mut self, listener: impl FnMut(bool) + Send + 'static) {
        self.mode_listener = Some(Box::new(listener));
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn is_selection_mode(&self) -> bool {
        matches!(self.selection, Selection::Active(_))
    }

    /// Selected items in collection order
    pub fn selected(&self) -> Vec<&MediaItem> {
        match &self.selection {
            Selection::Inactive => Vec::new(),
            Selection::Active(set) => self
                .items
                .iter()
                .filter(|item| set.contains(&item.path))
                .collect(),
        }
    }

    pub fn selected_count(&self) -> usize {
        match &self.selection {
            Selection::Inactive => 0,
            Selection::Active(set) => set.len(),
        }
    }

    pub fn is_selected(&self, path: &Path) -> bool {
        match &self.selection {
            Selection::Inactive => false,
            Selection::Active(set) => set.contains(path),
        }
    }

    fn contains(&self, path: &Path) -> bool {
        self.items.iter().any(|item| item.path == path)
    }

    /// Swap in a fresh listing; selected items that vanished are dropped
    ///
    /// Selection mode itself is left as it is.
    pub fn replace_collection(&mut self, items: Vec<MediaItem>) {
        self.items = items;
        if let Selection::Active(set) = &mut self.selection {
            let before = set.len();
            let present: HashSet<&Path> = self.items.iter().map(|i| i.path.as_path()).collect();
            set.retain(|path| present.contains(path.as_path()));
            if set.len() != before {
                debug!(pruned = before - set.len(), "Dropped vanished items from selection");
            }
        }
    }

    /// Long-press contract: enter and select `path`, or leave and clear
    ///
    /// Returns the new mode.
    pub fn toggle_selection_mode(&mut self, path: &Path) -> Result<bool, SelectionError> {
        // Leaving never depends on which item was pressed
        if self.is_selection_mode() {
            self.clear_selection();
            return Ok(false);
        }
        if !self.contains(path) {
            return Err(SelectionError::UnknownItem(path.to_path_buf()));
        }
        self.selection = Selection::Active(HashSet::from([path.to_path_buf()]));
        self.notify_mode(true);
        Ok(true)
    }

    /// Add or remove `path`; returns whether it is now selected
    ///
    /// An emptied selection keeps the mode on.
    pub fn toggle_item(&mut self, path: &Path) -> Result<bool, SelectionError> {
        if !self.contains(path) {
            return Err(SelectionError::UnknownItem(path.to_path_buf()));
        }
        let Selection::Active(set) = &mut self.selection else {
            return Err(SelectionError::NotSelecting);
        };
        if set.remove(path) {
            Ok(false)
        } else {
            set.insert(path.to_path_buf());
            Ok(true)
        }
    }

    /// Leave selection mode with nothing selected
    pub fn clear_selection(&mut self) {
        let was_active = self.is_selection_mode();
        self.selection = Selection::Inactive;
        if was_active {
            self.notify_mode(false);
        }
    }

    /// Delete every selected item through `delete`, then clear the selection
    ///
    /// Items are deleted one by one; a failure keeps that item in the
    /// collection and does not stop the rest of the batch.
    pub fn delete_selected<F>(&mut self, mut delete: F) -> DeleteReport
    where
        F: FnMut(&MediaItem) -> Result<(), StorageError>,
    {
        let mut report = DeleteReport::default();

        if let Selection::Active(set) = &self.selection {
            let mut removed = HashSet::new();
            for item in self.items.iter().filter(|item| set.contains(&item.path)) {
                match delete(item) {
                    Ok(()) => {
                        removed.insert(item.path.clone());
                        report.deleted.push(item.path.clone());
                    }
                    Err(reason) => {
                        warn!(path = %item.path.display(), error = %reason, "Failed to delete item");
                        report.failed.push(SelectionDeleteError {
                            path: item.path.clone(),
                            reason,
                        });
                    }
                }
            }
            self.items.retain(|item| !removed.contains(&item.path));
        }

        self.clear_selection();
        report
    }

    fn notify_mode(&mut self, active: bool) {
        debug!(active, "Selection mode changed");
        if let Some(listener) = self.mode_listener.as_mut() {
            listener(active);
        }
    }
}

impl std::fmt::Debug for SelectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionModel")
            .field("items", &self.items.len())
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}
