//! Playlist batch render
//!
//! A comma-separated list of up to ten songs is rendered into one
//! continuous mix. The feature sits behind a shared key that only hides it
//! from casual users; it is not an access-control boundary.

use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::{AssetPayload, FolderId, RenderBackend};
use crate::coordinator::{poll_asset, PollOutcome, PollPolicy};
use crate::error::{ClientError, ClientResult};

/// Maximum songs per playlist render
pub const MAX_PLAYLIST_SONGS: usize = 10;

/// Split a comma-separated song list: trim, drop empties, keep the first ten
pub fn normalize_playlist(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|song| !song.is_empty())
        .take(MAX_PLAYLIST_SONGS)
        .map(str::to_string)
        .collect()
}

/// Shared-key check in front of the playlist feature
///
/// An empty secret disables the gate.
#[derive(Debug, Clone)]
pub struct PlaylistGate {
    secret: String,
}

impl PlaylistGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.secret.is_empty()
    }

    pub fn check(&self, key: &str) -> ClientResult<()> {
        if !self.is_enabled() || key.trim() == self.secret {
            Ok(())
        } else {
            Err(ClientError::AccessDenied)
        }
    }
}

/// A finished playlist render
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistMix {
    pub id: FolderId,
    pub songs: Vec<String>,
    pub audio: AssetPayload,
}

/// Submits playlists and waits for the combined audio
pub struct PlaylistBuilder {
    backend: Arc<dyn RenderBackend>,
    gate: PlaylistGate,
    policy: PollPolicy,
}

impl PlaylistBuilder {
    pub fn new(backend: Arc<dyn RenderBackend>, gate: PlaylistGate, policy: PollPolicy) -> Self {
        Self {
            backend,
            gate,
            policy,
        }
    }

    /// Check the key, submit the normalized list and poll for the mix
    pub async fn build(&self, key: &str, input: &str) -> ClientResult<PlaylistMix> {
        self.gate.check(key)?;

        let songs = normalize_playlist(input);
        if songs.is_empty() {
            return Err(ClientError::InvalidInput("playlist has no songs".to_string()));
        }

        let id = self.backend.create_playlist(&songs).await.map_err(|e| {
            warn!(error = %e, "Playlist submission failed");
            ClientError::from(e)
        })?;
        info!(playlist = %id, songs = songs.len(), "Playlist render started");

        let backend = &self.backend;
        let playlist = &id;
        match poll_asset(self.policy, || true, move || backend.get_playlist(playlist)).await {
            PollOutcome::Ready(audio) => {
                info!(playlist = %id, bytes = audio.len(), "Playlist mix ready");
                Ok(PlaylistMix { id, songs, audio })
            }
            PollOutcome::Exhausted | PollOutcome::Abandoned => {
                warn!(playlist = %id, attempts = self.policy.max_attempts, "Playlist mix never became available");
                Err(ClientError::AssetTimeout {
                    attempts: self.policy.max_attempts,
                })
            }
        }
    }
}
