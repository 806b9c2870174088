//! Media capture session
//!
//! Owns the device stream and recorder for one recording attempt. Device
//! tracks are released on every exit path: `stop`, `reset`, a failed
//! `start`, a dropped `stop` future, and dropping the session itself.

use super::artifact::{ArtifactStore, RecordingArtifact};
use crate::capture::{
    CaptureError, CaptureResult, MediaConstraints, MediaHost, MediaRecorder, MediaStream,
    RecorderEvent,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Stops every live track of a stream when released or dropped
struct StreamGuard {
    stream: Box<dyn MediaStream>,
}

impl StreamGuard {
    fn new(stream: Box<dyn MediaStream>) -> Self {
        Self { stream }
    }

    fn stream(&self) -> &dyn MediaStream {
        self.stream.as_ref()
    }

    fn release(self) {
        drop(self);
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        let stream_id = self.stream.id().to_string();
        for track in self.stream.tracks_mut() {
            if track.is_live() {
                track.stop();
                tracing::debug!(
                    "Stopped {:?} track {} of stream {}",
                    track.info().kind,
                    track.info().id,
                    stream_id
                );
            }
        }
    }
}

/// A camera/microphone recording attempt
pub struct MediaCaptureSession {
    host: Arc<dyn MediaHost>,
    store: ArtifactStore,
    constraints: MediaConstraints,
    mime_type: String,

    stream: Option<StreamGuard>,
    recorder: Option<Box<dyn MediaRecorder>>,
    events: Option<mpsc::UnboundedReceiver<RecorderEvent>>,

    /// Fragments received so far, in produced order
    fragments: Vec<Vec<u8>>,

    artifact: Option<RecordingArtifact>,
}

impl MediaCaptureSession {
    pub fn new(host: Arc<dyn MediaHost>, store: ArtifactStore, mime_type: impl Into<String>) -> Self {
        Self {
            host,
            store,
            constraints: MediaConstraints::default(),
            mime_type: mime_type.into(),
            stream: None,
            recorder: None,
            events: None,
            fragments: Vec::new(),
            artifact: None,
        }
    }

    pub fn with_constraints(mut self, constraints: MediaConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Whether a recorder is currently bound
    pub fn is_active(&self) -> bool {
        self.recorder.is_some()
    }

    pub fn artifact(&self) -> Option<&RecordingArtifact> {
        self.artifact.as_ref()
    }

    pub fn fragments(&self) -> &[Vec<u8>] {
        &self.fragments
    }

    /// Request device access and start recording
    pub async fn start(&mut self) -> CaptureResult<()> {
        if self.stream.is_some() || self.recorder.is_some() {
            return Err(CaptureError::AlreadyActive);
        }

        // Leftovers from a previous attempt
        self.discard_artifact();
        self.fragments.clear();

        tracing::info!(
            "Requesting media access (video: {}, audio: {})",
            self.constraints.video,
            self.constraints.audio
        );

        let stream = StreamGuard::new(self.host.request_media(self.constraints).await?);
        let mut recorder = stream.stream().recorder(&self.mime_type)?;

        let (tx, rx) = mpsc::unbounded_channel();
        recorder.start(tx)?;

        tracing::info!("Recording started on stream {}", stream.stream().id());

        self.stream = Some(stream);
        self.recorder = Some(recorder);
        self.events = Some(rx);
        Ok(())
    }

    /// Drain fragments already delivered without finalizing; returns the
    /// number of bytes recorded so far.
    pub fn recorded_bytes(&mut self) -> usize {
        if let Some(events) = self.events.as_mut() {
            while let Ok(event) = events.try_recv() {
                match event {
                    RecorderEvent::DataAvailable(bytes) => {
                        if !bytes.is_empty() {
                            self.fragments.push(bytes);
                        }
                    }
                    RecorderEvent::Stopped => {
                        tracing::warn!("Recorder finalized before stop was requested");
                        self.events = None;
                        break;
                    }
                }
            }
        }
        self.fragments.iter().map(Vec::len).sum()
    }

    /// Finalize the recording. Returns `None` when nothing was recording.
    pub async fn stop(&mut self) -> CaptureResult<Option<RecordingArtifact>> {
        let Some(mut recorder) = self.recorder.take() else {
            return Ok(None);
        };
        let stream = self.stream.take();
        let events = self.events.take();

        let stop_result = recorder.stop();

        if let Some(stream) = stream {
            stream.release();
        }

        stop_result?;

        if let Some(mut events) = events {
            while let Some(event) = events.recv().await {
                match event {
                    RecorderEvent::DataAvailable(bytes) => {
                        if !bytes.is_empty() {
                            self.fragments.push(bytes);
                        }
                    }
                    RecorderEvent::Stopped => break,
                }
            }
        }
        drop(recorder);

        let artifact = self.store.register(&self.fragments, &self.mime_type);
        tracing::info!(
            "Recording finalized: {} fragments, {} bytes",
            self.fragments.len(),
            artifact.len()
        );

        self.artifact = Some(artifact.clone());
        Ok(Some(artifact))
    }

    /// Remove the artifact from the session without revoking its locator.
    /// The caller becomes responsible for it.
    pub fn take_artifact(&mut self) -> Option<RecordingArtifact> {
        self.artifact.take()
    }

    /// Discard any artifact and release every handle. Idempotent.
    pub fn reset(&mut self) {
        if let Some(mut recorder) = self.recorder.take() {
            if recorder.is_recording() {
                if let Err(e) = recorder.stop() {
                    tracing::warn!("Failed to stop recorder during reset: {}", e);
                }
            }
        }
        self.events = None;
        if let Some(stream) = self.stream.take() {
            stream.release();
        }
        self.discard_artifact();
        self.fragments.clear();
    }

    fn discard_artifact(&mut self) {
        if let Some(artifact) = self.artifact.take() {
            self.store.revoke(&artifact.locator);
        }
    }
}

impl Drop for MediaCaptureSession {
    fn drop(&mut self) {
        self.reset();
    }
}
