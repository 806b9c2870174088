//! Testimonial space API client
//!
//! `GET /api/space/{id}` for display metadata and `POST /api/feedback` for
//! submissions.

use crate::config::ApiConfig;
use crate::recorder::ArtifactLocator;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// API errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// The prompt question(s) configured for a space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Questions {
    Single(String),
    Many(Vec<String>),
}

impl Questions {
    pub fn display(&self) -> String {
        match self {
            Questions::Single(q) => q.clone(),
            Questions::Many(qs) => qs.join("\n"),
        }
    }
}

/// Display metadata of a testimonial space
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpaceDetails {
    #[serde(deserialize_with = "null_as_empty")]
    pub space_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub custom_message: String,
    pub questions: Option<Questions>,
}

/// Spaces created without a message store `null` in the optional columns
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /api/feedback`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    #[serde(rename = "noOfStars")]
    pub no_of_stars: u8,
    pub content: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "TestimonialSpaceId")]
    pub testimonial_space_id: String,
    #[serde(rename = "videoURL")]
    pub video_url: Option<ArtifactLocator>,
}

#[async_trait]
pub trait FeedbackApi: Send + Sync {
    async fn fetch_space(&self, space_id: &str) -> Result<SpaceDetails, ApiError>;

    /// Succeeds only on a 2xx response
    async fn submit_feedback(&self, payload: &FeedbackPayload) -> Result<(), ApiError>;
}

/// reqwest-backed client
pub struct HttpFeedbackApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpFeedbackApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        tracing::info!("Feedback API client initialized for {}", config.base_url);

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn space_url(&self, space_id: &str) -> String {
        format!("{}/api/space/{}", self.base_url, urlencoding::encode(space_id))
    }

    fn feedback_url(&self) -> String {
        format!("{}/api/feedback", self.base_url)
    }

    fn request_error(e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(e.to_string())
        }
    }

    async fn status_error(resp: reqwest::Response) -> ApiError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        ApiError::Status { status, body }
    }
}

#[async_trait]
impl FeedbackApi for HttpFeedbackApi {
    async fn fetch_space(&self, space_id: &str) -> Result<SpaceDetails, ApiError> {
        let resp = self
            .client
            .get(self.space_url(space_id))
            .send()
            .await
            .map_err(Self::request_error)?;

        if !resp.status().is_success() {
            return Err(Self::status_error(resp).await);
        }

        resp.json::<SpaceDetails>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn submit_feedback(&self, payload: &FeedbackPayload) -> Result<(), ApiError> {
        let resp = self
            .client
            .post(self.feedback_url())
            .json(payload)
            .send()
            .await
            .map_err(Self::request_error)?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::status_error(resp).await)
        }
    }
}
