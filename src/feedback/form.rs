//! Feedback form controller
//!
//! Loads the space metadata, offers the video and text paths, and submits
//! the combined draft. The recorder widget reports back through a handoff
//! channel that the form drains in [`FeedbackForm::sync_recorder`].

use super::api::{FeedbackApi, SpaceDetails};
use super::draft::FeedbackDraft;
use crate::capture::MediaHost;
use crate::config::RecorderConfig;
use crate::recorder::{ArtifactLocator, ArtifactStore, ConfirmPrompt, RecorderWidget};
use crate::utils::error::{AppError, AppResult};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Messages from an open recorder widget to the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderHandoff {
    Video(Option<ArtifactLocator>),
    Closed,
}

pub struct FeedbackForm {
    api: Arc<dyn FeedbackApi>,
    store: ArtifactStore,
    space_id: String,
    space: Option<SpaceDetails>,
    draft: FeedbackDraft,

    recorder_open: bool,
    text_dialog_open: bool,

    /// Shown next to the submit button but not required
    terms_accepted: bool,

    handoff_tx: mpsc::UnboundedSender<RecorderHandoff>,
    handoff_rx: mpsc::UnboundedReceiver<RecorderHandoff>,
}

impl FeedbackForm {
    pub fn new(api: Arc<dyn FeedbackApi>, store: ArtifactStore, space_id: impl Into<String>) -> Self {
        let (handoff_tx, handoff_rx) = mpsc::unbounded_channel();
        Self {
            api,
            store,
            space_id: space_id.into(),
            space: None,
            draft: FeedbackDraft::default(),
            recorder_open: false,
            text_dialog_open: false,
            terms_accepted: false,
            handoff_tx,
            handoff_rx,
        }
    }

    /// Create the form and load its space metadata
    pub async fn mount(
        api: Arc<dyn FeedbackApi>,
        store: ArtifactStore,
        space_id: impl Into<String>,
    ) -> Self {
        let mut form = Self::new(api, store, space_id);
        form.load_space().await;
        form
    }

    /// Fetch display metadata. On failure the fields stay blank.
    pub async fn load_space(&mut self) {
        match self.api.fetch_space(&self.space_id).await {
            Ok(space) => {
                tracing::debug!("Loaded space '{}'", space.space_name);
                self.space = Some(space);
            }
            Err(e) => {
                let error = AppError::FetchFailed(e);
                tracing::warn!("{} (space {})", error, self.space_id);
            }
        }
    }

    pub fn space_id(&self) -> &str {
        &self.space_id
    }

    pub fn space_name(&self) -> &str {
        self.space.as_ref().map(|s| s.space_name.as_str()).unwrap_or("")
    }

    pub fn custom_message(&self) -> &str {
        self.space.as_ref().map(|s| s.custom_message.as_str()).unwrap_or("")
    }

    pub fn question(&self) -> String {
        self.space
            .as_ref()
            .and_then(|s| s.questions.as_ref())
            .map(|q| q.display())
            .unwrap_or_default()
    }

    pub fn draft(&self) -> &FeedbackDraft {
        &self.draft
    }

    // Video path

    /// Open the recorder. The form card is hidden until the widget closes.
    pub fn open_recorder(
        &mut self,
        host: Arc<dyn MediaHost>,
        prompt: Arc<dyn ConfirmPrompt>,
        config: &RecorderConfig,
    ) -> RecorderWidget {
        if self.recorder_open {
            tracing::warn!("Recorder already open; replacing it");
        }
        if self.text_dialog_open {
            tracing::debug!("Closing text dialog for the recorder");
            self.text_dialog_open = false;
        }
        self.recorder_open = true;

        let close_tx = self.handoff_tx.clone();
        let video_tx = self.handoff_tx.clone();
        RecorderWidget::new(host, self.store.clone(), prompt, config, move || {
            let _ = close_tx.send(RecorderHandoff::Closed);
        })
        .with_video_recorded(move |url| {
            let _ = video_tx.send(RecorderHandoff::Video(url));
        })
    }

    pub fn is_recorder_open(&self) -> bool {
        self.recorder_open
    }

    /// Apply pending recorder handoffs; returns how many were applied
    pub fn sync_recorder(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(handoff) = self.handoff_rx.try_recv() {
            match handoff {
                RecorderHandoff::Video(url) => {
                    if let Some(previous) = self.draft.video_url.take() {
                        if Some(&previous) != url.as_ref() {
                            self.store.revoke(&previous);
                        }
                    }
                    self.draft.video_url = url;
                    self.recorder_open = false;
                }
                RecorderHandoff::Closed => {
                    self.recorder_open = false;
                }
            }
            applied += 1;
        }
        applied
    }

    // Text path

    /// Ignored while the recorder is open; only one path is shown at a time
    pub fn open_text_dialog(&mut self) {
        self.sync_recorder();
        if self.recorder_open {
            tracing::debug!("Recorder is open; not opening the text dialog");
            return;
        }
        self.text_dialog_open = true;
    }

    pub fn close_text_dialog(&mut self) {
        self.text_dialog_open = false;
    }

    pub fn is_text_dialog_open(&self) -> bool {
        self.text_dialog_open
    }

    pub fn select_star(&mut self, star: u8) -> bool {
        self.draft.select_star(star)
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.draft.content = content.into();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.draft.email = email.into();
    }

    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.terms_accepted = accepted;
    }

    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    /// Post the draft. On success every field is cleared; on failure the
    /// draft is left untouched so the user can submit again.
    pub async fn submit(&mut self) -> AppResult<()> {
        self.sync_recorder();

        if !self.terms_accepted {
            tracing::debug!("Submitting without terms acceptance");
        }

        let payload = self.draft.to_payload(&self.space_id);
        match self.api.submit_feedback(&payload).await {
            Ok(()) => {
                tracing::info!("Feedback submitted successfully");
                if let Some(video_url) = self.draft.clear() {
                    self.store.revoke(&video_url);
                }
                Ok(())
            }
            Err(e) => {
                let error = AppError::SubmissionFailed(e);
                tracing::error!("Something went wrong: {}", error);
                Err(error)
            }
        }
    }
}
