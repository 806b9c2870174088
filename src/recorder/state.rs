//! Recorder widget state
//!
//! Defines the widget state machine and the view model derived from it.

use super::artifact::ArtifactLocator;
use serde::{Deserialize, Serialize};

/// Placeholder shown before anything was recorded
pub const PLACEHOLDER_TEXT: &str = "Click \"Start Recording\" to begin";

/// Current state of the recorder widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetState {
    /// Nothing recorded yet
    #[default]
    Idle,
    /// Camera and microphone are live
    Recording,
    /// A finalized clip is available for preview
    Reviewing,
    /// The user confirmed posting; waiting for completion
    Submitting,
}

/// User actions offered by the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlKind {
    StartRecording,
    StopRecording,
    Reset,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    pub kind: ControlKind,
    pub label: String,
    pub enabled: bool,
}

impl Control {
    fn new(kind: ControlKind, label: &str, enabled: bool) -> Self {
        Self {
            kind,
            label: label.to_string(),
            enabled,
        }
    }
}

/// What the widget shows for a given state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetView {
    pub state: WidgetState,

    /// Pulsing marker while recording
    pub show_recording_indicator: bool,

    /// Live camera preview
    pub show_live_preview: bool,

    pub placeholder: Option<String>,

    /// Locator of the recorded clip for playback
    pub recorded_preview: Option<ArtifactLocator>,

    pub controls: Vec<Control>,
}

impl WidgetView {
    pub fn new(state: WidgetState, video_url: Option<&ArtifactLocator>) -> Self {
        let recording = state == WidgetState::Recording;

        let placeholder = if !recording && video_url.is_none() {
            Some(PLACEHOLDER_TEXT.to_string())
        } else {
            None
        };

        let mut controls = Vec::new();
        if !recording && video_url.is_none() {
            controls.push(Control::new(ControlKind::StartRecording, "Start Recording", true));
        }
        if recording {
            controls.push(Control::new(ControlKind::StopRecording, "Stop Recording", true));
        }
        if video_url.is_some() {
            let submitting = state == WidgetState::Submitting;
            if !submitting {
                controls.push(Control::new(ControlKind::Reset, "Reset", true));
            }
            let label = if submitting { "Posting..." } else { "Post" };
            controls.push(Control::new(ControlKind::Post, label, !submitting));
        }

        Self {
            state,
            show_recording_indicator: recording,
            show_live_preview: recording,
            placeholder,
            recorded_preview: video_url.cloned(),
            controls,
        }
    }

    pub fn control(&self, kind: ControlKind) -> Option<&Control> {
        self.controls.iter().find(|c| c.kind == kind)
    }
}
