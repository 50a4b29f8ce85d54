//! Transient media resources
//!
//! Resolved asset bodies are kept in memory and handed to the front end as
//! `blob:wedj/<uuid>` URLs, the way a browser hands out object URLs. Every
//! entry remembers the job generation it belongs to so a superseded job's
//! resources can be dropped in one call.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

use crate::backend::AssetPayload;

const BLOB_PREFIX: &str = "blob:wedj/";

/// URL of a displayable/playable resource
///
/// Either a local handle issued by [`MediaStore`] or, for the legacy search
/// response, a remote thumbnail URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaUrl(String);

impl MediaUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this URL points into a [`MediaStore`]
    pub fn is_local(&self) -> bool {
        self.0.starts_with(BLOB_PREFIX)
    }
}

impl fmt::Display for MediaUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored resource body
#[derive(Debug)]
pub struct MediaResource {
    pub generation: u64,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// In-memory resource table, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct MediaStore {
    entries: Arc<Mutex<HashMap<MediaUrl, Arc<MediaResource>>>>,
}

impl MediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MediaUrl, Arc<MediaResource>>> {
        // A panic while holding the lock cannot leave the map half-updated
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a payload and issue a URL for it
    pub fn register(&self, generation: u64, payload: AssetPayload) -> MediaUrl {
        let url = MediaUrl(format!("{}{}", BLOB_PREFIX, Uuid::new_v4()));
        let resource = MediaResource {
            generation,
            content_type: payload.content_type,
            bytes: payload.bytes,
        };
        self.lock().insert(url.clone(), Arc::new(resource));
        url
    }

    /// Resource behind a URL, if still held
    pub fn get(&self, url: &MediaUrl) -> Option<Arc<MediaResource>> {
        self.lock().get(url).cloned()
    }

    /// Drop one resource; returns whether it was held
    pub fn release(&self, url: &MediaUrl) -> bool {
        self.lock().remove(url).is_some()
    }

    /// Drop every resource of one generation
    pub fn release_generation(&self, generation: u64) -> usize {
        self.release_where(|resource| resource.generation == generation)
    }

    /// Drop every resource older than `generation`
    pub fn release_before(&self, generation: u64) -> usize {
        self.release_where(|resource| resource.generation < generation)
    }

    fn release_where(&self, predicate: impl Fn(&MediaResource) -> bool) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, resource| !predicate(resource));
        let released = before - entries.len();
        if released > 0 {
            debug!(released, remaining = entries.len(), "Released media resources");
        }
        released
    }

    /// Number of resources currently held
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
