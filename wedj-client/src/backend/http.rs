//! HTTP render backend client
//!
//! Endpoints, relative to the configured base URL:
//! - `GET  /api/search_song?query=`
//! - `GET  /api/get_song?folder_uuid=`
//! - `GET  /api/get_thumbnail?folder_uuid=&which=current|transition`
//! - `POST /api/create_playlist` with `{"songs": [...]}`
//! - `GET  /api/get_playlist?playlist_uuid=`

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Response;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::{AssetPayload, DirectAudio, FolderId, JobDescriptor, RenderBackend, SearchReply, ThumbnailSlot};
use crate::error::BackendError;

const USER_AGENT: &str = concat!("wedj/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT_SECS: u64 = 10;
/// Whole-request ceiling; asset bodies can be a few MB
const REQUEST_TIMEOUT_SECS: u64 = 60;

const HEADER_SONG_TITLE: &str = "x-song-title";
const HEADER_THUMBNAIL_URL: &str = "x-thumbnail-url";

/// Render backend reached over HTTP
pub struct HttpRenderBackend {
    http_client: reqwest::Client,
    base_url: String,
    search_suffix: String,
}

impl HttpRenderBackend {
    /// Build a client for `base_url`; `search_suffix` is appended to every
    /// search query (may be empty)
    pub fn new(base_url: &str, search_suffix: &str) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            search_suffix: search_suffix.trim().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Query text actually sent: user query plus suffix
    fn search_text(&self, query: &str) -> String {
        if self.search_suffix.is_empty() {
            query.to_string()
        } else {
            format!("{} {}", query, self.search_suffix)
        }
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Response, BackendError> {
        let url = self.endpoint(path);
        debug!(url = %url, "GET render backend");

        let response = self.http_client.get(&url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }
        Ok(response)
    }

    async fn read_payload(response: Response) -> Result<AssetPayload, BackendError> {
        let content_type = content_type(response.headers());
        let bytes = response.bytes().await?;
        Ok(AssetPayload::new(content_type, bytes.to_vec()))
    }
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Media type without parameters, lower-cased
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[async_trait]
impl RenderBackend for HttpRenderBackend {
    async fn search(&self, query: &str) -> Result<SearchReply, BackendError> {
        let text = self.search_text(query);
        let response = self.get("search_song", &[("query", text.as_str())]).await?;

        let headers = response.headers().clone();
        let declared = content_type(&headers).map(|c| essence(&c)).unwrap_or_default();

        if declared == "application/json" {
            let descriptor: JobDescriptor = response
                .json()
                .await
                .map_err(|e| BackendError::Malformed(format!("job descriptor: {}", e)))?;
            return Ok(SearchReply::Job(descriptor));
        }

        if declared.starts_with("audio/") || declared == "application/octet-stream" {
            warn!("Render backend answered search with a single audio body (deprecated protocol)");
            let audio = Self::read_payload(response).await?;
            return Ok(SearchReply::Direct(DirectAudio {
                audio,
                song_title: header_string(&headers, HEADER_SONG_TITLE),
                thumbnail_url: header_string(&headers, HEADER_THUMBNAIL_URL),
            }));
        }

        Err(BackendError::Malformed(format!(
            "unexpected content type {:?} for search",
            declared
        )))
    }

    async fn get_song(&self, folder: &FolderId) -> Result<AssetPayload, BackendError> {
        let response = self.get("get_song", &[("folder_uuid", folder.as_str())]).await?;
        Self::read_payload(response).await
    }

    async fn get_thumbnail(
        &self,
        folder: &FolderId,
        slot: ThumbnailSlot,
    ) -> Result<AssetPayload, BackendError> {
        let response = self
            .get(
                "get_thumbnail",
                &[("folder_uuid", folder.as_str()), ("which", slot.as_str())],
            )
            .await?;
        Self::read_payload(response).await
    }

    async fn create_playlist(&self, songs: &[String]) -> Result<FolderId, BackendError> {
        let url = self.endpoint("create_playlist");
        debug!(url = %url, songs = songs.len(), "POST render backend");

        let response = self
            .http_client
            .post(&url)
            .json(&json!({ "songs": songs }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let id: String = response
            .json()
            .await
            .map_err(|e| BackendError::Malformed(format!("playlist id: {}", e)))?;
        if id.trim().is_empty() {
            return Err(BackendError::Malformed("empty playlist id".to_string()));
        }
        Ok(FolderId::new(id))
    }

    async fn get_playlist(&self, playlist: &FolderId) -> Result<AssetPayload, BackendError> {
        let response = self
            .get("get_playlist", &[("playlist_uuid", playlist.as_str())])
            .await?;
        Self::read_payload(response).await
    }
}
