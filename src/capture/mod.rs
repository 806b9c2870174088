//! Host media capture
//!
//! This module defines the camera/microphone seam and its implementations.

pub mod traits;

#[cfg(feature = "native-capture")]
pub mod native;

#[cfg(test)]
pub(crate) mod testing;

// Re-export traits
pub use traits::{
    CameraInfo, CaptureError, CaptureResult, MediaConstraints, MediaHost, MediaRecorder,
    MediaStream, MediaTrack, RecorderEvent, TrackInfo, TrackKind,
};
