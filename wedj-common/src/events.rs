//! Event types for the WE-DJ event system
//!
//! Provides the shared [`MixEvent`] definitions and the [`EventBus`] the job
//! coordinator publishes lifecycle changes on. Front ends subscribe to show
//! progress ("Loading thumbnails...", "Generating transition...").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

/// One of the independently resolved outputs of a transition job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// The rendered transition (mandatory)
    TransitionAudio,
    /// Artwork for the currently playing song (best effort)
    CurrentThumbnail,
    /// Artwork for the song being transitioned into (best effort)
    TransitionThumbnail,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [
        AssetKind::TransitionAudio,
        AssetKind::CurrentThumbnail,
        AssetKind::TransitionThumbnail,
    ];

    /// Whether the job fails when this asset never resolves
    pub fn is_mandatory(&self) -> bool {
        matches!(self, AssetKind::TransitionAudio)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::TransitionAudio => "transition_audio",
            AssetKind::CurrentThumbnail => "current_thumbnail",
            AssetKind::TransitionThumbnail => "transition_thumbnail",
        };
        f.write_str(name)
    }
}

/// How a transition job ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleOutcome {
    /// Transition audio resolved
    Success,
    /// A newer search started first; not an error
    Superseded,
    /// Transition audio never resolved within the polling budget
    TimedOut,
    /// The search request itself failed
    Failed,
}

/// WE-DJ event types
///
/// Every job event carries the generation number of the search it belongs
/// to, so listeners can ignore events of superseded jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MixEvent {
    /// A search was submitted to the render backend
    JobSubmitted {
        generation: u64,
        query: String,
        timestamp: DateTime<Utc>,
    },

    /// The backend accepted the search; display labels are known
    LabelsAvailable {
        generation: u64,
        current_song: String,
        transition_song: String,
        timestamp: DateTime<Utc>,
    },

    /// One asset slot resolved to a media URL
    AssetResolved {
        generation: u64,
        asset: AssetKind,
        url: String,
        timestamp: DateTime<Utc>,
    },

    /// A job reached a terminal state
    JobSettled {
        generation: u64,
        outcome: SettleOutcome,
        timestamp: DateTime<Utc>,
    },
}

impl MixEvent {
    /// Generation of the job this event belongs to
    pub fn generation(&self) -> u64 {
        match self {
            MixEvent::JobSubmitted { generation, .. }
            | MixEvent::LabelsAvailable { generation, .. }
            | MixEvent::AssetResolved { generation, .. }
            | MixEvent::JobSettled { generation, .. } => *generation,
        }
    }
}

/// Broadcast bus for [`MixEvent`]s
///
/// Cloning shares the underlying channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MixEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// `capacity` is the number of events buffered per subscriber before the
    /// oldest are dropped for slow receivers.
    ///
    /// # Examples
    ///
    /// ```
    /// use wedj_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(64);
    /// assert_eq!(event_bus.capacity(), 64);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<MixEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: MixEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transition_audio_is_mandatory() {
        let mandatory: Vec<_> = AssetKind::ALL.iter().filter(|k| k.is_mandatory()).collect();
        assert_eq!(mandatory, vec![&AssetKind::TransitionAudio]);
    }

    #[test]
    fn test_emit_without_subscribers_is_dropped() {
        let bus = EventBus::new(8);
        assert_eq!(bus.subscriber_count(), 0);
        bus.emit_lossy(MixEvent::JobSettled {
            generation: 1,
            outcome: SettleOutcome::Success,
            timestamp: Utc::now(),
        });

        // Late subscribers do not see it
        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit_lossy(MixEvent::JobSubmitted {
            generation: 3,
            query: "Strobe Deadmau5".to_string(),
            timestamp: Utc::now(),
        });
        bus.emit_lossy(MixEvent::JobSettled {
            generation: 3,
            outcome: SettleOutcome::TimedOut,
            timestamp: Utc::now(),
        });

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, MixEvent::JobSubmitted { ref query, .. } if query == "Strobe Deadmau5"));
        let second = rx.recv().await.unwrap();
        assert_eq!(second.generation(), 3);
        assert!(matches!(
            second,
            MixEvent::JobSettled { outcome: SettleOutcome::TimedOut, .. }
        ));
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = MixEvent::AssetResolved {
            generation: 2,
            asset: AssetKind::CurrentThumbnail,
            url: "blob:wedj/abc".to_string(),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "AssetResolved");
        assert_eq!(value["asset"], "current_thumbnail");
    }
}
