//! Song model shared by the scorer and the client

use serde::{Deserialize, Serialize};

use crate::{Error, MusicalKey, Result};

/// A catalog or search-result song
///
/// Immutable once built. BPM and key are optional; when either side of a
/// comparison lacks one, that criterion is skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Identifier, unique within a catalog
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Tempo in beats per minute (positive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,
    /// Musical key, serialized by name ("F#m", "Bb")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<MusicalKey>,
}

impl Song {
    pub fn new(id: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            bpm: None,
            key: None,
        }
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = Some(bpm);
        self
    }

    pub fn with_key(mut self, key: MusicalKey) -> Self {
        self.key = Some(key);
        self
    }

    /// "Title - Artist"
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }

    /// Check field invariants for songs loaded from external data
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidInput("song id must not be empty".to_string()));
        }
        if let Some(bpm) = self.bpm {
            if !bpm.is_finite() || bpm <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "song {} has non-positive BPM {}",
                    self.id, bpm
                )));
            }
        }
        Ok(())
    }
}
