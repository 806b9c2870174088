//! Capture trait definitions
//!
//! Host-agnostic traits for camera/microphone acquisition and recording.
//! A host hands out a [`MediaStream`] when device access is granted; the
//! stream owns its tracks and can bind a [`MediaRecorder`] to itself.
//! Recorders report fragments and finalization over an mpsc channel
//! instead of callbacks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors raised by a capture host
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("A capture session is already active")]
    AlreadyActive,

    #[error("Recorder error: {0}")]
    Recorder(String),
}

/// Result type alias for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Which devices to request from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConstraints {
    pub video: bool,
    pub audio: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            video: true,
            audio: true,
        }
    }
}

/// Kind of media carried by a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

/// Information about a single device track
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    /// Unique track ID
    pub id: String,

    /// Video or audio
    pub kind: TrackKind,

    /// Human readable device label
    pub label: String,
}

/// Information about a camera/webcam
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraInfo {
    /// Unique device ID
    pub id: String,

    /// Device name
    pub name: String,
}

/// Notification delivered by a recorder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// One fragment of encoded media, in produced order
    DataAvailable(Vec<u8>),
    /// The recorder flushed its last fragment; always delivered last
    Stopped,
}

/// A live device track. Stopping it releases the device (indicator light off).
pub trait MediaTrack: Send {
    fn info(&self) -> &TrackInfo;

    fn is_live(&self) -> bool;

    /// Stop the track. Must be idempotent.
    fn stop(&mut self);
}

/// A granted camera/microphone stream
pub trait MediaStream: Send {
    fn id(&self) -> &str;

    fn tracks_mut(&mut self) -> &mut [Box<dyn MediaTrack>];

    /// Bind a new recorder to this stream
    fn recorder(&self, mime_type: &str) -> CaptureResult<Box<dyn MediaRecorder>>;
}

/// Encodes a stream into fragments
pub trait MediaRecorder: Send {
    /// Start recording. Fragments and the final `Stopped` are sent to `events`.
    fn start(&mut self, events: mpsc::UnboundedSender<RecorderEvent>) -> CaptureResult<()>;

    /// Request finalization. The recorder flushes any buffered data and then
    /// sends `Stopped`.
    fn stop(&mut self) -> CaptureResult<()>;

    fn is_recording(&self) -> bool;
}

/// The host environment granting device access
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Request device access. Resolves once the user (or platform) decides.
    async fn request_media(&self, constraints: MediaConstraints)
        -> CaptureResult<Box<dyn MediaStream>>;
}
