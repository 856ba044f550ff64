// SPDX-License-Identifier: MPL-2.0

//! Video recording pipeline
//!
//! Owns the in-flight recording between start and the device finalize:
//! elapsed-time notifications, stop, and registration of direct-file
//! recordings with the media store.

pub mod recorder;

pub use recorder::{RecordingSession, Registration};
