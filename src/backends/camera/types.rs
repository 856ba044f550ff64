// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use serde::{Deserialize, Serialize};

/// Physical camera module facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lens {
    /// Selfie camera, facing the user
    Front,
    /// Main camera on the back of the device
    #[default]
    Back,
}

impl Lens {
    pub const ALL: [Lens; 2] = [Lens::Front, Lens::Back];

    /// The opposite lens (what the switch button selects)
    pub fn toggled(self) -> Self {
        match self {
            Lens::Front => Lens::Back,
            Lens::Back => Lens::Front,
        }
    }

    /// Location label as reported by device enumeration ("front" / "back")
    pub fn location(&self) -> &'static str {
        match self {
            Lens::Front => "front",
            Lens::Back => "back",
        }
    }

    /// Parse a device location label
    pub fn from_location(location: &str) -> Option<Self> {
        match location.trim().to_ascii_lowercase().as_str() {
            "front" | "user" => Some(Lens::Front),
            "back" | "rear" | "environment" => Some(Lens::Back),
            _ => None,
        }
    }
}

impl std::fmt::Display for Lens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.location())
    }
}

/// What a screen captures; fixed for the lifetime of a session controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptureMode {
    Photo,
    Video,
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureMode::Photo => write!(f, "photo"),
            CaptureMode::Video => write!(f, "video"),
        }
    }
}

/// Opaque identifier of the surface the preview is rendered into
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewSurface(String);

impl PreviewSurface {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PreviewSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a device needs to establish a binding
///
/// `mode` doubles as the capability set: photo bindings attach a still
/// capture use case, video bindings attach a recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    pub lens: Lens,
    pub mode: CaptureMode,
    pub surface: PreviewSurface,
}

impl std::fmt::Display for BindRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} lens, {} mode on {}", self.lens, self.mode, self.surface)
    }
}

/// Token for one live device binding
///
/// Deliberately not `Clone`: the only way to give it back is
/// [`CaptureDevice::unbind`](super::CaptureDevice::unbind), which consumes it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct DeviceHandle {
    id: u64,
    lens: Lens,
    mode: CaptureMode,
}

impl DeviceHandle {
    /// Mint a handle. Only device implementations should call this.
    pub fn new(id: u64, lens: Lens, mode: CaptureMode) -> Self {
        Self { id, lens, mode }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn lens(&self) -> Lens {
        self.lens
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Camera permission has not been granted
    PermissionDenied,
    /// Device is held by another binding or process
    Busy,
    /// The device has no camera facing this way
    LensNotSupported(Lens),
    /// The binding does not carry the capability the request needs
    WrongMode(CaptureMode),
    /// Handle is unknown to the device (already unbound)
    StaleHandle,
    /// Recording already in progress
    RecordingInProgress,
    /// General I/O error
    IoError(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::PermissionDenied => write!(f, "Camera permission denied"),
            BackendError::Busy => write!(f, "Camera is busy"),
            BackendError::LensNotSupported(lens) => write!(f, "No {} camera available", lens),
            BackendError::WrongMode(mode) => write!(f, "Binding is not set up for {}", mode),
            BackendError::StaleHandle => write!(f, "Camera binding is no longer valid"),
            BackendError::RecordingInProgress => write!(f, "Recording already in progress"),
            BackendError::IoError(msg) => write!(f, "I/O error: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::IoError(err.to_string())
    }
}
