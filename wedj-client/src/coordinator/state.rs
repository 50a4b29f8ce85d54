//! Job lifecycle state as seen by the front end

use serde::Serialize;
use wedj_common::events::{AssetKind, SettleOutcome};

use crate::backend::FolderId;
use crate::media::MediaUrl;

/// Where the active search is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobPhase {
    /// No search yet
    Idle,
    /// Search sent, waiting for the backend to accept it
    Submitting,
    /// Job accepted; assets being polled
    AwaitingAssets { folder: FolderId },
    /// Terminal
    Settled { outcome: SettleOutcome },
}

impl JobPhase {
    pub fn is_settled(&self) -> bool {
        matches!(self, JobPhase::Settled { .. })
    }

    /// Whether asset results may still be applied
    pub(crate) fn accepts_assets(&self) -> bool {
        matches!(
            self,
            JobPhase::AwaitingAssets { .. }
                | JobPhase::Settled {
                    outcome: SettleOutcome::Success
                }
        )
    }
}

/// Resolution state of one asset slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "url", rename_all = "snake_case")]
pub enum AssetSlot {
    #[default]
    Unresolved,
    Resolved(MediaUrl),
    Failed,
}

impl AssetSlot {
    pub fn url(&self) -> Option<&MediaUrl> {
        match self {
            AssetSlot::Resolved(url) => Some(url),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, AssetSlot::Resolved(_))
    }
}

/// The active transition job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionJob {
    /// Backend folder; `None` for the legacy single-response search
    pub folder: Option<FolderId>,
    pub current_song_label: String,
    pub transition_song_label: String,
    pub transition_audio: AssetSlot,
    pub current_thumbnail: AssetSlot,
    pub transition_thumbnail: AssetSlot,
    /// Assets whose polling budget ran out; their slots stay unresolved
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exhausted: Vec<AssetKind>,
}

impl TransitionJob {
    pub fn slot(&self, asset: AssetKind) -> &AssetSlot {
        match asset {
            AssetKind::TransitionAudio => &self.transition_audio,
            AssetKind::CurrentThumbnail => &self.current_thumbnail,
            AssetKind::TransitionThumbnail => &self.transition_thumbnail,
        }
    }

    pub(crate) fn slot_mut(&mut self, asset: AssetKind) -> &mut AssetSlot {
        match asset {
            AssetKind::TransitionAudio => &mut self.transition_audio,
            AssetKind::CurrentThumbnail => &mut self.current_thumbnail,
            AssetKind::TransitionThumbnail => &mut self.transition_thumbnail,
        }
    }

    /// Whether polling for `asset` gave up
    pub fn is_exhausted(&self, asset: AssetKind) -> bool {
        self.exhausted.contains(&asset)
    }

    /// Any thumbnail still being polled
    pub fn thumbnails_pending(&self) -> bool {
        [AssetKind::CurrentThumbnail, AssetKind::TransitionThumbnail]
            .into_iter()
            .any(|asset| *self.slot(asset) == AssetSlot::Unresolved && !self.is_exhausted(asset))
    }
}

/// Snapshot published to the front end
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionView {
    /// Generation of the search this snapshot describes (0 before any search)
    pub generation: u64,
    pub phase: JobPhase,
    pub query: Option<String>,
    pub job: Option<TransitionJob>,
    /// Short inline message for failed or timed-out searches
    pub notice: Option<String>,
}

impl Default for TransitionView {
    fn default() -> Self {
        Self {
            generation: 0,
            phase: JobPhase::Idle,
            query: None,
            job: None,
            notice: None,
        }
    }
}

impl TransitionView {
    /// Transition audio URL, once playable
    pub fn transition_audio(&self) -> Option<&MediaUrl> {
        self.job.as_ref().and_then(|job| job.transition_audio.url())
    }

    /// Whether the front end should show "Generating transition..."
    pub fn is_generating(&self) -> bool {
        matches!(self.phase, JobPhase::Submitting | JobPhase::AwaitingAssets { .. })
    }

    /// Whether the front end should show "Loading thumbnails..."
    pub fn is_loading_thumbnails(&self) -> bool {
        self.job.as_ref().is_some_and(|job| job.thumbnails_pending())
            && self.phase.accepts_assets()
    }
}
