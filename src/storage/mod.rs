//! Object storage for finished artifacts.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context as _;

use crate::foundation::error::{FadeError, FadeResult};

/// Google Cloud Storage client.
pub mod gcs;

/// Content type of title clips.
pub const WEBM_CONTENT_TYPE: &str = "video/webm";
/// Content type of snapshots.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Public URL of `object_name` in `bucket`.
pub fn public_url(bucket: &str, object_name: &str) -> String {
    format!("https://storage.googleapis.com/{bucket}/{object_name}")
}

/// Destination for uploaded artifacts. Shared read-only by all requests.
pub trait ObjectStore: Send + Sync {
    /// Destination bucket.
    fn bucket(&self) -> &str;

    /// Whether the client finished initializing.
    fn is_initialized(&self) -> bool {
        true
    }

    /// Upload the file at `local` as `object_name` and return its public URL.
    fn upload(&self, local: &Path, object_name: &str, content_type: &str) -> FadeResult<String>;
}

/// Object store keeping uploads in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    bucket: String,
    objects: Mutex<BTreeMap<String, (String, Vec<u8>)>>,
}

impl InMemoryStore {
    /// Empty store named `bucket`.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(BTreeMap::new()),
        }
    }

    /// Content type and bytes of `object_name`, if uploaded.
    pub fn object(&self, object_name: &str) -> Option<(String, Vec<u8>)> {
        self.objects.lock().ok()?.get(object_name).cloned()
    }

    /// Names of all uploaded objects.
    pub fn object_names(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl ObjectStore for InMemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn upload(&self, local: &Path, object_name: &str, content_type: &str) -> FadeResult<String> {
        let bytes = std::fs::read(local)
            .with_context(|| format!("failed to read upload source '{}'", local.display()))?;
        self.objects
            .lock()
            .map_err(|_| FadeError::upload("in-memory store lock poisoned"))?
            .insert(object_name.to_string(), (content_type.to_string(), bytes));
        Ok(public_url(&self.bucket, object_name))
    }
}
