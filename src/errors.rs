// SPDX-License-Identifier: MPL-2.0

//! Error types for the camera application
//!
//! Every error here is local to the operation that raised it: controllers and
//! models stay usable after returning one.

use crate::backends::camera::{BackendError, CaptureMode, Cancelled, Lens};
use std::fmt;
use std::path::{Path, PathBuf};

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    Bind(DeviceBindError),
    Capture(CaptureError),
    RecordingStart(RecordingStartError),
    RecordingFinalize(RecordingFinalizeError),
    Selection(SelectionError),
    Viewer(ViewerError),
    Storage(StorageError),
    Config(ConfigError),
    /// Generic error with message
    Other(String),
}

/// Binding the camera failed; the controller stays unbound
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceBindError {
    /// Camera permission missing
    PermissionDenied,
    /// Device held elsewhere
    Busy,
    /// No camera facing this way
    UnsupportedLens(Lens),
    /// Device unavailable for another reason
    Unavailable(String),
}

/// Still capture failed; the binding is unaffected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// No camera bound
    NotBound,
    /// Controller is not in photo mode
    WrongMode(CaptureMode),
    /// Could not prepare the destination file
    Storage(String),
    /// Device reported a failure
    Failed(String),
}

/// Recording could not start; nothing changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingStartError {
    /// No camera bound
    NotBound,
    /// Controller is not in video mode
    WrongMode(CaptureMode),
    /// A session already exists
    AlreadyRecording,
    /// Could not allocate the destination
    SinkUnavailable(String),
    /// Device refused to start
    Device(String),
}

/// The recording ended but its file may be incomplete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingFinalizeError {
    /// Device reported a write failure
    Device(String),
    /// Device dropped the session without reporting
    Cancelled,
}

/// Store operation failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    NotFound(PathBuf),
    /// Relative path leaves the store root
    InvalidPath(PathBuf),
    Io { path: PathBuf, message: String },
}

/// One item of a batch delete could not be removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionDeleteError {
    pub path: PathBuf,
    pub reason: StorageError,
}

/// Selection operation rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Per-item toggles need selection mode
    NotSelecting,
    /// Item is not part of the displayed collection
    UnknownItem(PathBuf),
}

/// Full-screen viewer errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerError {
    NotFound(PathBuf),
}

/// Configuration load/save errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NoConfigDir,
    Io(String),
    Parse(String),
}

impl StorageError {
    /// Attach a path to an I/O error
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(path.to_path_buf())
        } else {
            StorageError::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Bind(e) => write!(f, "Camera error: {}", e),
            AppError::Capture(e) => write!(f, "Photo error: {}", e),
            AppError::RecordingStart(e) => write!(f, "Recording error: {}", e),
            AppError::RecordingFinalize(e) => write!(f, "Recording error: {}", e),
            AppError::Selection(e) => write!(f, "Selection error: {}", e),
            AppError::Viewer(e) => write!(f, "Viewer error: {}", e),
            AppError::Storage(e) => write!(f, "Storage error: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for DeviceBindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceBindError::PermissionDenied => write!(f, "The camera permission is necessary"),
            DeviceBindError::Busy => write!(f, "Camera is busy"),
            DeviceBindError::UnsupportedLens(lens) => write!(f, "No {} camera on this device", lens),
            DeviceBindError::Unavailable(msg) => write!(f, "Camera initialization failed: {}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NotBound => write!(f, "Camera is not initialized"),
            CaptureError::WrongMode(mode) => write!(f, "Cannot take a photo in {} mode", mode),
            CaptureError::Storage(msg) => write!(f, "Cannot write photo: {}", msg),
            CaptureError::Failed(msg) => write!(f, "Error taking photo: {}", msg),
        }
    }
}

impl fmt::Display for RecordingStartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingStartError::NotBound => write!(f, "Camera is not initialized"),
            RecordingStartError::WrongMode(mode) => write!(f, "Cannot record in {} mode", mode),
            RecordingStartError::AlreadyRecording => write!(f, "Recording already in progress"),
            RecordingStartError::SinkUnavailable(msg) => {
                write!(f, "Cannot create recording destination: {}", msg)
            }
            RecordingStartError::Device(msg) => write!(f, "Failed to start recording: {}", msg),
        }
    }
}

impl fmt::Display for RecordingFinalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingFinalizeError::Device(msg) => write!(f, "Recording failed: {}", msg),
            RecordingFinalizeError::Cancelled => write!(f, "Recording ended without finalizing"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(path) => write!(f, "File not found: {}", path.display()),
            StorageError::InvalidPath(path) => write!(f, "Invalid store path: {}", path.display()),
            StorageError::Io { path, message } => write!(f, "{}: {}", path.display(), message),
        }
    }
}

impl fmt::Display for SelectionDeleteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to delete {}: {}", self.path.display(), self.reason)
    }
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::NotSelecting => write!(f, "Selection mode is not active"),
            SelectionError::UnknownItem(path) => write!(f, "Not in gallery: {}", path.display()),
        }
    }
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::NotFound(path) => {
                write!(f, "File not found or invalid path: {}", path.display())
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "No configuration directory on this system"),
            ConfigError::Io(msg) => write!(f, "I/O error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Malformed configuration: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for DeviceBindError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for RecordingStartError {}
impl std::error::Error for RecordingFinalizeError {}
impl std::error::Error for StorageError {}
impl std::error::Error for SelectionDeleteError {}
impl std::error::Error for SelectionError {}
impl std::error::Error for ViewerError {}
impl std::error::Error for ConfigError {}

// Device errors into the caller-facing taxonomy
impl From<BackendError> for DeviceBindError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::PermissionDenied => DeviceBindError::PermissionDenied,
            BackendError::Busy => DeviceBindError::Busy,
            BackendError::LensNotSupported(lens) => DeviceBindError::UnsupportedLens(lens),
            other => DeviceBindError::Unavailable(other.to_string()),
        }
    }
}

impl From<BackendError> for CaptureError {
    fn from(err: BackendError) -> Self {
        CaptureError::Failed(err.to_string())
    }
}

impl From<BackendError> for RecordingStartError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::RecordingInProgress => RecordingStartError::AlreadyRecording,
            other => RecordingStartError::Device(other.to_string()),
        }
    }
}

impl From<BackendError> for RecordingFinalizeError {
    fn from(err: BackendError) -> Self {
        RecordingFinalizeError::Device(err.to_string())
    }
}

impl From<Cancelled> for RecordingFinalizeError {
    fn from(_: Cancelled) -> Self {
        RecordingFinalizeError::Cancelled
    }
}

// Conversions from sub-errors to AppError
impl From<DeviceBindError> for AppError {
    fn from(err: DeviceBindError) -> Self {
        AppError::Bind(err)
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<RecordingStartError> for AppError {
    fn from(err: RecordingStartError) -> Self {
        AppError::RecordingStart(err)
    }
}

impl From<RecordingFinalizeError> for AppError {
    fn from(err: RecordingFinalizeError) -> Self {
        AppError::RecordingFinalize(err)
    }
}

impl From<SelectionError> for AppError {
    fn from(err: SelectionError) -> Self {
        AppError::Selection(err)
    }
}

impl From<ViewerError> for AppError {
    fn from(err: ViewerError) -> Self {
        AppError::Viewer(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}
