//! Open Testimonials - Collect video and text testimonials, made simple.
//!
//! This is the main library crate for the testimonial collection client.
//! It provides the video recorder, the feedback form controller, and the
//! client for the testimonial space API.

pub mod capture;
pub mod config;
pub mod feedback;
pub mod recorder;
pub mod utils;

pub use config::AppConfig;
pub use feedback::{FeedbackForm, HttpFeedbackApi};
pub use recorder::{ArtifactStore, RecorderWidget};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging. `RUST_LOG` takes precedence over the
/// configured filter. Later calls are ignored.
pub fn init_tracing(config: &AppConfig) {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::info!("Starting Open Testimonials v{}", env!("CARGO_PKG_VERSION"));
    }
}
