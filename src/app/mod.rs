// SPDX-License-Identifier: MPL-2.0

//! Screen-level models for the camera application
//!
//! # Architecture
//!
//! - `session`: Capture screen controller (binding, lens, photo and video capture)
//! - `gallery`: Gallery screen model (listing, multi-select, viewer)
//! - `state`: Shared state types and session events
//!
//! Rendering is left to the embedding UI; these types only issue commands to
//! the camera backend and media store and report what happened.

pub mod gallery;
pub mod session;
pub mod state;

pub use gallery::{
    BackOutcome, DeleteReport, DeletedMedia, Gallery, MediaViewer, SelectionModel, TapOutcome,
};
pub use session::{CaptureSessionController, SessionServices, SessionSettings};
pub use state::{BindingState, RecordingState, SessionEvent, SessionObserver};
