//! Display labels for backend-produced song files
//!
//! The render backend names songs after the downloaded files, URL-encoded,
//! e.g. `Gangnam%20Style%20-%20PSY%20(Audio).mp3`. The UI shows
//! `Gangnam Style - PSY`.

use std::borrow::Cow;

/// Separator between title and artist in flattened labels
pub const TITLE_ARTIST_SEPARATOR: &str = " - ";

const AUDIO_SUFFIX: &str = ".mp3";
const AUDIO_ANNOTATION: &str = " (Audio)";

/// Decode a backend filename into a display label
///
/// Percent-decodes (keeping the raw text if it is not valid UTF-8 once
/// decoded), then strips the `.mp3` extension and a trailing ` (Audio)`.
pub fn decode_label(raw: &str) -> String {
    let decoded = urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw));
    let mut label = decoded.trim();

    if let Some(stem) = strip_suffix_ignore_case(label, AUDIO_SUFFIX) {
        label = stem;
    }
    if let Some(stem) = label.strip_suffix(AUDIO_ANNOTATION) {
        label = stem;
    }

    label.trim().to_string()
}

/// Split "Title - Artist" on the first separator
///
/// Returns the whole label as the title when there is no separator.
pub fn split_title_artist(label: &str) -> (&str, Option<&str>) {
    match label.split_once(TITLE_ARTIST_SEPARATOR) {
        Some((title, artist)) => (title.trim(), Some(artist.trim())),
        None => (label.trim(), None),
    }
}

/// "Title by Artist" for a flattened label, or just the title
pub fn describe_label(label: &str) -> String {
    match split_title_artist(label) {
        (title, Some(artist)) => format!("{} by {}", title, artist),
        (title, None) => title.to_string(),
    }
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split_at = s.len().checked_sub(suffix.len())?;
    let tail = s.get(split_at..)?;
    if tail.eq_ignore_ascii_case(suffix) {
        s.get(..split_at)
    } else {
        None
    }
}
