//! Video recording module
//!
//! This module implements the testimonial video recorder:
//! - MediaCaptureSession owning the device stream and recorder
//! - ArtifactStore handing out ephemeral locators for finished clips
//! - RecorderWidget state machine and its view model

pub mod artifact;
pub mod session;
pub mod state;
pub mod widget;

pub use artifact::{ArtifactLocator, ArtifactStore, RecordingArtifact};
pub use session::MediaCaptureSession;
pub use state::{Control, ControlKind, WidgetState, WidgetView};
pub use widget::{ConfirmPrompt, PostOutcome, RecorderWidget, WidgetEvent, WidgetStateHandle};
