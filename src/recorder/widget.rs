//! Recorder widget
//!
//! Drives a [`MediaCaptureSession`] through `idle -> recording -> reviewing
//! -> submitting` and reports the outcome to its parent through one-shot
//! callbacks. The close callback fires exactly once per widget.

use super::artifact::{ArtifactLocator, ArtifactStore};
use super::session::MediaCaptureSession;
use super::state::{WidgetState, WidgetView};
use crate::capture::MediaHost;
use crate::config::RecorderConfig;
use crate::utils::error::{AppError, ErrorResponse};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Blocking yes/no confirmation shown before posting
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

pub type CloseCallback = Box<dyn FnOnce() + Send>;
pub type VideoRecordedCallback = Box<dyn FnOnce(Option<ArtifactLocator>) + Send>;

/// Events emitted by the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    StateChanged(WidgetState),
    Error(ErrorResponse),
    Posted(ArtifactLocator),
    Closed,
}

/// Result of a post request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// The clip was handed to the parent and the widget closed
    Posted(ArtifactLocator),
    /// The user declined the confirmation prompt
    Declined,
    /// Nothing to post in the current state
    Ignored,
}

/// Read-only view of the widget state, usable while an action is pending
#[derive(Debug, Clone)]
pub struct WidgetStateHandle(Arc<RwLock<WidgetState>>);

impl WidgetStateHandle {
    pub fn get(&self) -> WidgetState {
        *self.0.read()
    }
}

pub struct RecorderWidget {
    state: Arc<RwLock<WidgetState>>,
    session: MediaCaptureSession,

    /// Locator of the clip under review
    video_url: Option<ArtifactLocator>,

    prompt: Arc<dyn ConfirmPrompt>,
    confirm_message: String,
    post_delay: Duration,

    on_close: Option<CloseCallback>,
    on_video_recorded: Option<VideoRecordedCallback>,

    event_tx: broadcast::Sender<WidgetEvent>,
}

impl RecorderWidget {
    pub fn new(
        host: Arc<dyn MediaHost>,
        store: ArtifactStore,
        prompt: Arc<dyn ConfirmPrompt>,
        config: &RecorderConfig,
        on_close: impl FnOnce() + Send + 'static,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            state: Arc::new(RwLock::new(WidgetState::Idle)),
            session: MediaCaptureSession::new(host, store, config.mime_type.clone()),
            video_url: None,
            prompt,
            confirm_message: config.confirm_message.clone(),
            post_delay: config.post_delay(),
            on_close: Some(Box::new(on_close)),
            on_video_recorded: None,
            event_tx,
        }
    }

    /// Receive the final locator when a clip is posted
    pub fn with_video_recorded(
        mut self,
        on_video_recorded: impl FnOnce(Option<ArtifactLocator>) + Send + 'static,
    ) -> Self {
        self.on_video_recorded = Some(Box::new(on_video_recorded));
        self
    }

    pub fn state(&self) -> WidgetState {
        *self.state.read()
    }

    pub fn state_handle(&self) -> WidgetStateHandle {
        WidgetStateHandle(self.state.clone())
    }

    pub fn video_url(&self) -> Option<&ArtifactLocator> {
        self.video_url.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.on_close.is_none()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WidgetEvent> {
        self.event_tx.subscribe()
    }

    pub fn view(&self) -> WidgetView {
        WidgetView::new(self.state(), self.video_url.as_ref())
    }

    /// Bytes captured so far in the current recording
    pub fn recorded_bytes(&mut self) -> usize {
        self.session.recorded_bytes()
    }

    fn set_state(&self, state: WidgetState) {
        *self.state.write() = state;
        let _ = self.event_tx.send(WidgetEvent::StateChanged(state));
    }

    fn emit_error(&self, error: AppError) {
        let _ = self.event_tx.send(WidgetEvent::Error(error.into()));
    }

    /// Repair the state left behind when a `stop_recording` or `post_video`
    /// future was dropped before completing. Those futures hold the widget
    /// borrowed, so seeing their state here means they were abandoned.
    fn recover_interrupted(&mut self) {
        match self.state() {
            WidgetState::Recording if !self.session.is_active() => {
                tracing::warn!("Recording was interrupted before it finalized");
                self.session.reset();
                self.set_state(WidgetState::Idle);
            }
            WidgetState::Submitting => {
                tracing::warn!("Post was interrupted; returning to review");
                if self.video_url.is_some() {
                    self.set_state(WidgetState::Reviewing);
                } else {
                    self.session.reset();
                    self.set_state(WidgetState::Idle);
                }
            }
            _ => {}
        }
    }

    /// Request camera and microphone and begin recording. Device errors are
    /// logged and leave the widget idle.
    pub async fn start_recording(&mut self) {
        self.recover_interrupted();
        if self.is_closed() || self.state() != WidgetState::Idle || self.video_url.is_some() {
            tracing::debug!("Ignoring start request in state {:?}", self.state());
            return;
        }

        match self.session.start().await {
            Ok(()) => self.set_state(WidgetState::Recording),
            Err(e) => {
                tracing::error!("Error accessing the camera and microphone: {}", e);
                self.emit_error(e.into());
            }
        }
    }

    /// Stop recording and move to review once the clip is finalized
    pub async fn stop_recording(&mut self) {
        self.recover_interrupted();
        if self.state() != WidgetState::Recording {
            return;
        }

        match self.session.stop().await {
            Ok(Some(artifact)) => {
                self.video_url = Some(artifact.locator);
                self.set_state(WidgetState::Reviewing);
            }
            Ok(None) => {
                self.session.reset();
                self.set_state(WidgetState::Idle);
            }
            Err(e) => {
                tracing::error!("Failed to finalize recording: {}", e);
                self.session.reset();
                self.set_state(WidgetState::Idle);
                self.emit_error(e.into());
            }
        }
    }

    /// Discard the clip and return to idle. A pending `post_video` keeps the
    /// widget borrowed, so a reset cannot interleave with submitting.
    pub fn reset_recording(&mut self) {
        self.recover_interrupted();

        self.session.reset();
        self.video_url = None;
        if self.state() != WidgetState::Idle {
            self.set_state(WidgetState::Idle);
        }
    }

    /// Ask for confirmation, wait for completion, then hand the clip to the
    /// parent and close.
    pub async fn post_video(&mut self) -> PostOutcome {
        self.recover_interrupted();
        if self.state() != WidgetState::Reviewing {
            return PostOutcome::Ignored;
        }
        let Some(locator) = self.video_url.clone() else {
            return PostOutcome::Ignored;
        };

        if !self.prompt.confirm(&self.confirm_message) {
            tracing::info!("Post declined");
            return PostOutcome::Declined;
        }

        self.set_state(WidgetState::Submitting);
        tokio::time::sleep(self.post_delay).await;

        self.video_url = None;
        if let Some(on_video_recorded) = self.on_video_recorded.take() {
            // The parent owns the locator from here on
            let _ = self.session.take_artifact();
            on_video_recorded(Some(locator.clone()));
        }
        let _ = self.event_tx.send(WidgetEvent::Posted(locator.clone()));
        tracing::info!("Video posted: {}", locator);

        self.set_state(WidgetState::Idle);
        self.close();
        PostOutcome::Posted(locator)
    }

    /// Abandon the widget from any state
    pub fn cancel(&mut self) {
        if self.is_closed() {
            return;
        }
        self.session.reset();
        self.video_url = None;
        if self.state() != WidgetState::Idle {
            self.set_state(WidgetState::Idle);
        }
        self.close();
    }

    fn close(&mut self) {
        if let Some(on_close) = self.on_close.take() {
            on_close();
            let _ = self.event_tx.send(WidgetEvent::Closed);
            tracing::debug!("Recorder widget closed");
        }
    }
}
