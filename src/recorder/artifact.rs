//! Recording artifacts and their ephemeral locators
//!
//! A finalized recording is registered in an [`ArtifactStore`], which hands
//! out a `blob:` locator usable for preview and submission until it is
//! revoked. Locators only live as long as the store (one UI session).

use crate::config::RecorderConfig;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Ephemeral reference to a registered artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactLocator(String);

impl ArtifactLocator {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A finalized recording
#[derive(Debug, Clone)]
pub struct RecordingArtifact {
    pub locator: ArtifactLocator,
    pub mime_type: String,
    pub data: Arc<Vec<u8>>,
    pub created_at: DateTime<Utc>,
}

impl RecordingArtifact {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone)]
struct StoredBlob {
    mime_type: String,
    data: Arc<Vec<u8>>,
}

/// Registry of live artifact locators
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    origin: String,
    blobs: Arc<RwLock<HashMap<ArtifactLocator, StoredBlob>>>,
}

impl ArtifactStore {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            blobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &RecorderConfig) -> Self {
        Self::new(config.locator_origin.clone())
    }

    /// Concatenate `fragments` into one blob and register it
    pub fn register(&self, fragments: &[Vec<u8>], mime_type: &str) -> RecordingArtifact {
        let data: Vec<u8> = fragments.concat();
        let locator = ArtifactLocator(format!("blob:{}/{}", self.origin, Uuid::new_v4()));
        let data = Arc::new(data);

        self.blobs.write().insert(
            locator.clone(),
            StoredBlob {
                mime_type: mime_type.to_string(),
                data: data.clone(),
            },
        );

        tracing::debug!("Registered artifact {} ({} bytes)", locator, data.len());

        RecordingArtifact {
            locator,
            mime_type: mime_type.to_string(),
            data,
            created_at: Utc::now(),
        }
    }

    /// Look up the bytes behind a locator, if it is still valid
    pub fn resolve(&self, locator: &ArtifactLocator) -> Option<(String, Arc<Vec<u8>>)> {
        self.blobs
            .read()
            .get(locator)
            .map(|blob| (blob.mime_type.clone(), blob.data.clone()))
    }

    /// Invalidate a locator. Returns false if it was not registered.
    pub fn revoke(&self, locator: &ArtifactLocator) -> bool {
        let removed = self.blobs.write().remove(locator).is_some();
        if removed {
            tracing::debug!("Revoked artifact {}", locator);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new("localhost")
    }
}
