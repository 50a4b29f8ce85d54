//! Job retrieval coordinator
//!
//! Turns one free-text search into a transition job and resolves its three
//! assets (transition audio, two thumbnails) by polling the render backend.
//!
//! Every search starts a new generation. All state changes go through the
//! `watch` sender's modify closures, which check the generation and the
//! phase before writing, so a poll result or search reply belonging to a
//! superseded job can never become visible.
//!
//! Lock order: view, then media store.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use wedj_common::events::{AssetKind, EventBus, MixEvent, SettleOutcome};
use wedj_common::labels::decode_label;

use crate::backend::{AssetPayload, DirectAudio, FolderId, JobDescriptor, RenderBackend, SearchReply};
use crate::error::{ClientError, ClientResult};
use crate::media::{MediaStore, MediaUrl};

pub mod poller;
pub mod state;

pub use poller::{poll_asset, PollOutcome, PollPolicy};
pub use state::{AssetSlot, JobPhase, TransitionJob, TransitionView};

/// Handle on one submitted search
#[derive(Debug)]
pub struct JobTicket {
    generation: u64,
    rx: watch::Receiver<TransitionView>,
}

impl JobTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait until this job settles or is replaced by a newer search
    ///
    /// Resolves to `Success` as soon as the transition audio is playable;
    /// thumbnails may still arrive afterwards.
    pub async fn settled(mut self) -> SettleOutcome {
        let generation = self.generation;
        let view = self
            .rx
            .wait_for(|view| view.generation != generation || view.phase.is_settled())
            .await;

        match view {
            Ok(view) if view.generation == generation => match view.phase {
                JobPhase::Settled { outcome } => outcome,
                _ => SettleOutcome::Superseded,
            },
            // Newer generation, or the coordinator is gone
            _ => SettleOutcome::Superseded,
        }
    }
}

/// Owns the active transition job, its polling tasks and its media
#[derive(Clone)]
pub struct TransitionCoordinator {
    backend: Arc<dyn RenderBackend>,
    policy: PollPolicy,
    view: Arc<watch::Sender<TransitionView>>,
    media: MediaStore,
    events: EventBus,
}

impl TransitionCoordinator {
    pub fn new(backend: Arc<dyn RenderBackend>, policy: PollPolicy, events: EventBus) -> Self {
        let (view, _) = watch::channel(TransitionView::default());
        Self {
            backend,
            policy,
            view: Arc::new(view),
            media: MediaStore::new(),
            events,
        }
    }

    /// Receiver for UI snapshots
    pub fn subscribe(&self) -> watch::Receiver<TransitionView> {
        self.view.subscribe()
    }

    /// Current snapshot
    pub fn snapshot(&self) -> TransitionView {
        self.view.borrow().clone()
    }

    /// Store resolving this coordinator's media URLs
    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Submit a search, superseding whatever job is active
    ///
    /// Returns once the backend has answered the search request (or the
    /// search was superseded while waiting). Asset polling continues in
    /// background tasks; await [`JobTicket::settled`] for the outcome.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank query (state is left untouched)
    /// - `Submission` / `MalformedResponse` when the search request fails;
    ///   the job settles as `Failed` with a notice
    pub async fn search(&self, query: &str) -> ClientResult<JobTicket> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::InvalidInput("search query is empty".to_string()));
        }

        let mut generation = 0;
        let mut superseded = None;
        self.view.send_modify(|view| {
            if matches!(view.phase, JobPhase::Submitting | JobPhase::AwaitingAssets { .. }) {
                superseded = Some(view.generation);
            }
            view.generation += 1;
            generation = view.generation;
            view.phase = JobPhase::Submitting;
            view.query = Some(query.to_string());
            view.job = None;
            view.notice = None;
            self.media.release_before(generation);
        });

        if let Some(old) = superseded {
            info!(generation = old, "Transition job superseded");
            self.emit_settled(old, SettleOutcome::Superseded);
        }
        info!(generation, query, "Submitting transition search");
        self.events.emit_lossy(MixEvent::JobSubmitted {
            generation,
            query: query.to_string(),
            timestamp: Utc::now(),
        });

        let ticket = JobTicket {
            generation,
            rx: self.view.subscribe(),
        };

        let reply = self.backend.search(query).await;
        if !self.is_current(generation) {
            debug!(generation, "Discarding search reply for superseded job");
            return Ok(ticket);
        }

        match reply {
            Ok(SearchReply::Job(descriptor)) => self.accept_job(generation, descriptor),
            Ok(SearchReply::Direct(direct)) => self.accept_direct(generation, query, direct),
            Err(e) => {
                let err = ClientError::from(e);
                if self.fail_submission(generation, &err) {
                    return Err(err);
                }
            }
        }

        Ok(ticket)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.view.borrow().generation == generation
    }

    /// Current generation and still accepting asset results
    fn is_live(&self, generation: u64) -> bool {
        let view = self.view.borrow();
        view.generation == generation && view.phase.accepts_assets()
    }

    fn emit_settled(&self, generation: u64, outcome: SettleOutcome) {
        self.events.emit_lossy(MixEvent::JobSettled {
            generation,
            outcome,
            timestamp: Utc::now(),
        });
    }

    fn fail_submission(&self, generation: u64, err: &ClientError) -> bool {
        let applied = self.view.send_if_modified(|view| {
            if view.generation != generation || view.phase != JobPhase::Submitting {
                return false;
            }
            view.phase = JobPhase::Settled {
                outcome: SettleOutcome::Failed,
            };
            view.notice = Some(err.user_message().to_string());
            true
        });

        if applied {
            warn!(generation, error = %err, "Transition search failed");
            self.emit_settled(generation, SettleOutcome::Failed);
        }
        applied
    }

    fn accept_job(&self, generation: u64, descriptor: JobDescriptor) {
        let current_song = decode_label(&descriptor.current_song);
        let transition_song = decode_label(&descriptor.transition_song);
        let folder = descriptor.folder;

        let applied = self.view.send_if_modified(|view| {
            if view.generation != generation || view.phase != JobPhase::Submitting {
                return false;
            }
            view.phase = JobPhase::AwaitingAssets {
                folder: folder.clone(),
            };
            view.job = Some(TransitionJob {
                folder: Some(folder.clone()),
                current_song_label: current_song.clone(),
                transition_song_label: transition_song.clone(),
                transition_audio: AssetSlot::Unresolved,
                current_thumbnail: AssetSlot::Unresolved,
                transition_thumbnail: AssetSlot::Unresolved,
                exhausted: Vec::new(),
            });
            true
        });
        if !applied {
            return;
        }

        info!(
            generation,
            folder = %folder,
            current = %current_song,
            transition = %transition_song,
            "Transition job accepted"
        );
        self.events.emit_lossy(MixEvent::LabelsAvailable {
            generation,
            current_song,
            transition_song,
            timestamp: Utc::now(),
        });

        for asset in AssetKind::ALL {
            self.spawn_poller(generation, folder.clone(), asset);
        }
    }

    fn accept_direct(&self, generation: u64, query: &str, direct: DirectAudio) {
        warn!(generation, "Search returned audio directly; deprecated response shape");

        let transition_song = direct
            .song_title
            .as_deref()
            .map(decode_label)
            .unwrap_or_default();
        let DirectAudio {
            audio,
            thumbnail_url,
            ..
        } = direct;

        let mut audio_url = None;
        let applied = self.view.send_if_modified(|view| {
            if view.generation != generation || view.phase != JobPhase::Submitting {
                return false;
            }
            let url = self.media.register(generation, audio);
            view.job = Some(TransitionJob {
                folder: None,
                current_song_label: query.to_string(),
                transition_song_label: transition_song.clone(),
                transition_audio: AssetSlot::Resolved(url.clone()),
                current_thumbnail: AssetSlot::Failed,
                transition_thumbnail: match thumbnail_url.as_deref() {
                    Some(remote) => AssetSlot::Resolved(MediaUrl::new(remote)),
                    None => AssetSlot::Failed,
                },
                exhausted: Vec::new(),
            });
            view.phase = JobPhase::Settled {
                outcome: SettleOutcome::Success,
            };
            audio_url = Some(url);
            true
        });
        if !applied {
            return;
        }

        self.events.emit_lossy(MixEvent::LabelsAvailable {
            generation,
            current_song: query.to_string(),
            transition_song,
            timestamp: Utc::now(),
        });
        if let Some(url) = audio_url {
            self.emit_resolved(generation, AssetKind::TransitionAudio, &url);
        }
        if let Some(remote) = thumbnail_url {
            self.emit_resolved(generation, AssetKind::TransitionThumbnail, &MediaUrl::new(remote));
        }
        self.emit_settled(generation, SettleOutcome::Success);
    }

    fn emit_resolved(&self, generation: u64, asset: AssetKind, url: &MediaUrl) {
        self.events.emit_lossy(MixEvent::AssetResolved {
            generation,
            asset,
            url: url.to_string(),
            timestamp: Utc::now(),
        });
    }

    fn spawn_poller(&self, generation: u64, folder: FolderId, asset: AssetKind) {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let backend = &coordinator.backend;
            let folder = &folder;
            let outcome = poll_asset(
                coordinator.policy,
                || coordinator.is_live(generation),
                move || backend.fetch_asset(folder, asset),
            )
            .await;

            match outcome {
                PollOutcome::Ready(payload) => coordinator.apply_asset(generation, asset, payload),
                PollOutcome::Exhausted => coordinator.exhaust_asset(generation, asset),
                PollOutcome::Abandoned => {
                    debug!(generation, asset = %asset, "Stopped polling for inactive job");
                }
            }
        });
    }

    fn apply_asset(&self, generation: u64, asset: AssetKind, payload: AssetPayload) {
        let bytes = payload.len();
        let mut resolved = None;
        let mut settled = false;

        self.view.send_if_modified(|view| {
            if view.generation != generation || !view.phase.accepts_assets() {
                return false;
            }
            let Some(job) = view.job.as_mut() else {
                return false;
            };
            let url = self.media.register(generation, payload);
            *job.slot_mut(asset) = AssetSlot::Resolved(url.clone());
            if asset.is_mandatory() {
                view.phase = JobPhase::Settled {
                    outcome: SettleOutcome::Success,
                };
                settled = true;
            }
            resolved = Some(url);
            true
        });

        let Some(url) = resolved else {
            debug!(generation, asset = %asset, "Discarding asset for inactive job");
            return;
        };

        info!(generation, asset = %asset, bytes, url = %url, "Asset resolved");
        self.emit_resolved(generation, asset, &url);
        if settled {
            self.emit_settled(generation, SettleOutcome::Success);
        }
    }

    fn exhaust_asset(&self, generation: u64, asset: AssetKind) {
        let attempts = self.policy.max_attempts;

        if !asset.is_mandatory() {
            let applied = self.view.send_if_modified(|view| {
                if view.generation != generation || !view.phase.accepts_assets() {
                    return false;
                }
                match view.job.as_mut() {
                    Some(job) if !job.is_exhausted(asset) => {
                        job.exhausted.push(asset);
                        true
                    }
                    _ => false,
                }
            });
            if applied {
                warn!(generation, asset = %asset, attempts, "Thumbnail never became available");
            }
            return;
        }

        let applied = self.view.send_if_modified(|view| {
            if view.generation != generation || view.phase.is_settled() {
                return false;
            }
            if let Some(job) = view.job.as_mut() {
                job.transition_audio = AssetSlot::Failed;
                job.current_thumbnail = AssetSlot::Failed;
                job.transition_thumbnail = AssetSlot::Failed;
            }
            view.phase = JobPhase::Settled {
                outcome: SettleOutcome::TimedOut,
            };
            view.notice = Some(ClientError::AssetTimeout { attempts }.user_message().to_string());
            self.media.release_generation(generation);
            true
        });

        if applied {
            warn!(generation, attempts, "Transition audio never became available");
            self.emit_settled(generation, SettleOutcome::TimedOut);
        }
    }
}
