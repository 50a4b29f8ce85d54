//! Render backend contract
//!
//! The render service is a black box: a search eventually yields a job
//! folder whose transition audio and thumbnails appear once rendered. The
//! coordinator only talks to it through [`RenderBackend`]; the HTTP
//! implementation lives in [`http`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use wedj_common::events::AssetKind;

use crate::error::BackendError;

pub mod http;

pub use http::HttpRenderBackend;

/// Opaque job/folder identifier issued by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(String);

impl FolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which song of the transition a thumbnail belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThumbnailSlot {
    Current,
    Transition,
}

impl ThumbnailSlot {
    /// Wire name used in the `which` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbnailSlot::Current => "current",
            ThumbnailSlot::Transition => "transition",
        }
    }
}

/// Job handle returned by an accepted search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub folder: FolderId,
    /// URL-encoded filename of the currently playing song
    #[serde(rename = "current-song")]
    pub current_song: String,
    /// URL-encoded filename of the song being transitioned into
    #[serde(rename = "transition-song")]
    pub transition_song: String,
}

/// Legacy single-response render: audio in the body, metadata in headers
#[derive(Debug, Clone, PartialEq)]
pub struct DirectAudio {
    pub audio: AssetPayload,
    /// `X-Song-Title` header
    pub song_title: Option<String>,
    /// `X-Thumbnail-Url` header
    pub thumbnail_url: Option<String>,
}

/// The two response shapes of `search`
#[derive(Debug, Clone, PartialEq)]
pub enum SearchReply {
    /// Job descriptor; assets are polled afterwards
    Job(JobDescriptor),
    /// Deprecated: the rendered audio itself
    Direct(DirectAudio),
}

/// Binary asset body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPayload {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl AssetPayload {
    pub fn new(content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Operations the render service offers
///
/// Any error from an asset fetch means "not ready yet" to the poller; only
/// `search` and `create_playlist` errors are surfaced as failures.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Submit a free-text search; returns a job handle (or legacy audio)
    async fn search(&self, query: &str) -> Result<SearchReply, BackendError>;

    /// Rendered transition audio for a job
    async fn get_song(&self, folder: &FolderId) -> Result<AssetPayload, BackendError>;

    /// Artwork for one side of the transition
    async fn get_thumbnail(
        &self,
        folder: &FolderId,
        slot: ThumbnailSlot,
    ) -> Result<AssetPayload, BackendError>;

    /// Start a batch render of up to ten songs
    async fn create_playlist(&self, songs: &[String]) -> Result<FolderId, BackendError>;

    /// Combined audio of a batch render
    async fn get_playlist(&self, playlist: &FolderId) -> Result<AssetPayload, BackendError>;

    /// Fetch whichever endpoint backs an asset slot
    async fn fetch_asset(
        &self,
        folder: &FolderId,
        asset: AssetKind,
    ) -> Result<AssetPayload, BackendError> {
        match asset {
            AssetKind::TransitionAudio => self.get_song(folder).await,
            AssetKind::CurrentThumbnail => self.get_thumbnail(folder, ThumbnailSlot::Current).await,
            AssetKind::TransitionThumbnail => {
                self.get_thumbnail(folder, ThumbnailSlot::Transition).await
            }
        }
    }
}
