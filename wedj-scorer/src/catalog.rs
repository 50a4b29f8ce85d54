//! Song catalogs
//!
//! The built-in demo catalog is the tracklist the web front end shipped
//! with. Larger catalogs are loaded from TOML (`[[songs]]` tables) or JSON
//! (a top-level array) files.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;
use wedj_common::{Error, MusicalKey, Result, Song};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    songs: Vec<Song>,
}

fn demo(id: &str, title: &str, artist: &str, bpm: f64, key: &str) -> Song {
    let song = Song::new(id, title, artist).with_bpm(bpm);
    match key.parse::<MusicalKey>() {
        Ok(k) => song.with_key(k),
        Err(_) => song,
    }
}

/// Eight-track electronic catalog
pub fn demo_catalog() -> Vec<Song> {
    vec![
        demo("t1", "Strobe", "Deadmau5", 128.0, "F#m"),
        demo("t2", "Language", "Porter Robinson", 128.0, "G"),
        demo("t3", "Ghosts 'n' Stuff", "Deadmau5", 128.0, "F#m"),
        demo("t4", "Scary Monsters and Nice Sprites", "Skrillex", 140.0, "G#m"),
        demo("t5", "Bangarang", "Skrillex", 110.0, "F#m"),
        demo("t6", "Silhouettes", "Avicii", 128.0, "C#m"),
        demo("t7", "Don't You Worry Child", "Swedish House Mafia", 129.0, "Bb"),
        demo("t8", "Save The World", "Swedish House Mafia", 126.0, "F#m"),
    ]
}

/// Load a catalog file; format chosen by extension (`.json`, else TOML)
pub fn load_catalog(path: &Path) -> Result<Vec<Song>> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let songs = if is_json {
        serde_json::from_str::<Vec<Song>>(&content)?
    } else {
        toml::from_str::<CatalogFile>(&content)?.songs
    };

    validate_catalog(&songs)?;
    info!("Loaded {} songs from {}", songs.len(), path.display());
    Ok(songs)
}

/// Check song invariants and id uniqueness
pub fn validate_catalog(songs: &[Song]) -> Result<()> {
    let mut seen = HashSet::with_capacity(songs.len());
    for song in songs {
        song.validate()?;
        if !seen.insert(song.id.as_str()) {
            return Err(Error::InvalidInput(format!(
                "duplicate song id in catalog: {}",
                song.id
            )));
        }
    }
    Ok(())
}

/// Look a song up by id
pub fn find_song<'a>(catalog: &'a [Song], id: &str) -> Option<&'a Song> {
    catalog.iter().find(|s| s.id == id)
}
