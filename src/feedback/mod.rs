//! Feedback collection
//!
//! The form controller, the draft it edits, and the API it submits to.

pub mod api;
pub mod draft;
pub mod form;

pub use api::{ApiError, FeedbackApi, FeedbackPayload, HttpFeedbackApi, Questions, SpaceDetails};
pub use draft::{FeedbackDraft, StarRating};
pub use form::{FeedbackForm, RecorderHandoff};
