//! Scripted in-memory render backend
//!
//! Search replies are keyed by query; assets by (folder, asset kind). Any
//! reply can be held until the test releases it, which is how supersession
//! races are staged deterministically.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use wedj_client::backend::{
    AssetPayload, DirectAudio, FolderId, JobDescriptor, RenderBackend, SearchReply, ThumbnailSlot,
};
use wedj_client::BackendError;
use wedj_common::events::AssetKind;

#[derive(Clone)]
struct ScriptedSearch {
    reply: Result<SearchReply, BackendError>,
    hold: Option<Arc<Notify>>,
}

#[derive(Clone)]
struct ScriptedAsset {
    /// 1-based attempt from which the asset is served
    ready_from: u32,
    payload: AssetPayload,
    hold: Option<Arc<Notify>>,
}

#[derive(Clone)]
struct ScriptedPlaylist {
    reply: Result<String, BackendError>,
    ready_from: u32,
    payload: AssetPayload,
}

type AssetKey = (String, AssetKind);

/// Render backend double driven entirely by the test
#[derive(Default)]
pub struct FakeBackend {
    searches: Mutex<HashMap<String, ScriptedSearch>>,
    assets: Mutex<HashMap<AssetKey, ScriptedAsset>>,
    attempts: Mutex<HashMap<AssetKey, u32>>,
    playlist: Mutex<Option<ScriptedPlaylist>>,
    submitted_playlists: Mutex<Vec<Vec<String>>>,
    search_calls: AtomicU32,
    playlist_attempts: AtomicU32,
}

pub fn audio(bytes: &[u8]) -> AssetPayload {
    AssetPayload::new(Some("audio/mpeg".to_string()), bytes.to_vec())
}

pub fn image(bytes: &[u8]) -> AssetPayload {
    AssetPayload::new(Some("image/jpeg".to_string()), bytes.to_vec())
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `query` with a job descriptor
    pub fn with_job(&self, query: &str, folder: &str, current_song: &str, transition_song: &str) {
        self.with_search_reply(
            query,
            Ok(SearchReply::Job(JobDescriptor {
                folder: FolderId::new(folder),
                current_song: current_song.to_string(),
                transition_song: transition_song.to_string(),
            })),
        );
    }

    /// Answer `query` with the legacy single-response shape
    pub fn with_direct(&self, query: &str, direct: DirectAudio) {
        self.with_search_reply(query, Ok(SearchReply::Direct(direct)));
    }

    pub fn with_search_reply(&self, query: &str, reply: Result<SearchReply, BackendError>) {
        self.searches
            .lock()
            .unwrap()
            .insert(query.to_string(), ScriptedSearch { reply, hold: None });
    }

    /// Block the reply to `query` until the returned handle is notified
    pub fn hold_search(&self, query: &str) -> Arc<Notify> {
        let hold = Arc::new(Notify::new());
        if let Some(script) = self.searches.lock().unwrap().get_mut(query) {
            script.hold = Some(Arc::clone(&hold));
        }
        hold
    }

    /// Serve an asset from attempt `ready_from` on (1 = immediately)
    pub fn with_asset(&self, folder: &str, asset: AssetKind, ready_from: u32, payload: AssetPayload) {
        self.assets.lock().unwrap().insert(
            (folder.to_string(), asset),
            ScriptedAsset {
                ready_from,
                payload,
                hold: None,
            },
        );
    }

    /// Block a ready asset's response until the returned handle is notified
    pub fn hold_asset(&self, folder: &str, asset: AssetKind) -> Arc<Notify> {
        let hold = Arc::new(Notify::new());
        if let Some(script) = self.assets.lock().unwrap().get_mut(&(folder.to_string(), asset)) {
            script.hold = Some(Arc::clone(&hold));
        }
        hold
    }

    pub fn with_playlist(&self, reply: Result<&str, BackendError>, ready_from: u32, payload: AssetPayload) {
        *self.playlist.lock().unwrap() = Some(ScriptedPlaylist {
            reply: reply.map(str::to_string),
            ready_from,
            payload,
        });
    }

    pub fn search_calls(&self) -> u32 {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Fetch attempts seen for one asset of one folder
    pub fn attempts(&self, folder: &str, asset: AssetKind) -> u32 {
        self.attempts
            .lock()
            .unwrap()
            .get(&(folder.to_string(), asset))
            .copied()
            .unwrap_or(0)
    }

    pub fn playlist_attempts(&self) -> u32 {
        self.playlist_attempts.load(Ordering::SeqCst)
    }

    pub fn submitted_playlists(&self) -> Vec<Vec<String>> {
        self.submitted_playlists.lock().unwrap().clone()
    }

    async fn serve_asset(&self, folder: &FolderId, asset: AssetKind) -> Result<AssetPayload, BackendError> {
        let key = (folder.as_str().to_string(), asset);
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let count = attempts.entry(key.clone()).or_insert(0);
            *count += 1;
            *count
        };

        let script = self.assets.lock().unwrap().get(&key).cloned();
        let Some(script) = script else {
            return Err(BackendError::Status(404));
        };
        if attempt < script.ready_from {
            return Err(BackendError::Status(404));
        }
        if let Some(hold) = script.hold {
            hold.notified().await;
        }
        Ok(script.payload)
    }
}

#[async_trait]
impl RenderBackend for FakeBackend {
    async fn search(&self, query: &str) -> Result<SearchReply, BackendError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.searches.lock().unwrap().get(query).cloned();
        let Some(script) = script else {
            return Err(BackendError::Status(500));
        };
        if let Some(hold) = script.hold {
            hold.notified().await;
        }
        script.reply
    }

    async fn get_song(&self, folder: &FolderId) -> Result<AssetPayload, BackendError> {
        self.serve_asset(folder, AssetKind::TransitionAudio).await
    }

    async fn get_thumbnail(
        &self,
        folder: &FolderId,
        slot: ThumbnailSlot,
    ) -> Result<AssetPayload, BackendError> {
        let asset = match slot {
            ThumbnailSlot::Current => AssetKind::CurrentThumbnail,
            ThumbnailSlot::Transition => AssetKind::TransitionThumbnail,
        };
        self.serve_asset(folder, asset).await
    }

    async fn create_playlist(&self, songs: &[String]) -> Result<FolderId, BackendError> {
        self.submitted_playlists.lock().unwrap().push(songs.to_vec());
        let script = self.playlist.lock().unwrap().clone();
        match script {
            Some(script) => script.reply.map(FolderId::new),
            None => Err(BackendError::Status(500)),
        }
    }

    async fn get_playlist(&self, _playlist: &FolderId) -> Result<AssetPayload, BackendError> {
        let attempt = self.playlist_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let script = self.playlist.lock().unwrap().clone();
        match script {
            Some(script) if attempt >= script.ready_from => Ok(script.payload),
            _ => Err(BackendError::Status(404)),
        }
    }
}
