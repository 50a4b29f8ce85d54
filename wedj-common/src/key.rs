//! Musical key names
//!
//! A key keeps the spelling it was written with: "A#" and "Bb" are different
//! keys as far as equality goes, exactly as they are different catalog
//! strings. [`MusicalKey::same_pitch`] compares the sounding key instead.
//! Parsing accepts sharps, flats and the usual minor suffixes and
//! normalizes them to the short form ("F#m", "Bb").

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Sharp, flat or neither
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    fn offset(&self) -> i8 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

use Accidental::{Flat, Natural, Sharp};

/// Spelling used for major keys built from a pitch class (C = 0)
const MAJOR_SPELLINGS: [(char, Accidental); 12] = [
    ('C', Natural),
    ('D', Flat),
    ('D', Natural),
    ('E', Flat),
    ('E', Natural),
    ('F', Natural),
    ('F', Sharp),
    ('G', Natural),
    ('A', Flat),
    ('A', Natural),
    ('B', Flat),
    ('B', Natural),
];

/// Spelling used for minor keys built from a pitch class (C = 0)
const MINOR_SPELLINGS: [(char, Accidental); 12] = [
    ('C', Natural),
    ('C', Sharp),
    ('D', Natural),
    ('E', Flat),
    ('E', Natural),
    ('F', Natural),
    ('F', Sharp),
    ('G', Natural),
    ('G', Sharp),
    ('A', Natural),
    ('B', Flat),
    ('B', Natural),
];

/// Major or minor tonality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Major,
    Minor,
}

/// A spelled musical key: letter, accidental and mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MusicalKey {
    letter: char,
    accidental: Accidental,
    mode: Mode,
}

fn natural_pitch(letter: char) -> Option<i8> {
    match letter {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

impl MusicalKey {
    /// Key for a pitch class (wrapped into 0-11) and mode, in the usual spelling
    pub fn new(tonic: u8, mode: Mode) -> Self {
        let spellings = match mode {
            Mode::Major => &MAJOR_SPELLINGS,
            Mode::Minor => &MINOR_SPELLINGS,
        };
        let (letter, accidental) = spellings[(tonic % 12) as usize];
        Self {
            letter,
            accidental,
            mode,
        }
    }

    /// Pitch class of the tonic, 0-11 with C = 0
    pub fn tonic(&self) -> u8 {
        let natural = natural_pitch(self.letter).unwrap_or(0);
        (natural + self.accidental.offset()).rem_euclid(12) as u8
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn accidental(&self) -> Accidental {
        self.accidental
    }

    /// Same sounding key, whatever the spelling ("Gbm" and "F#m")
    pub fn same_pitch(&self, other: &MusicalKey) -> bool {
        self.mode == other.mode && self.tonic() == other.tonic()
    }

    /// Relative major of a minor key, relative minor of a major key
    pub fn relative(&self) -> Self {
        match self.mode {
            Mode::Minor => Self::new(self.tonic() + 3, Mode::Major),
            Mode::Major => Self::new(self.tonic() + 9, Mode::Minor),
        }
    }

    /// Display name, e.g. "F#m" or "Bb"
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MusicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.mode {
            Mode::Major => "",
            Mode::Minor => "m",
        };
        write!(f, "{}{}{}", self.letter, self.accidental.symbol(), suffix)
    }
}

impl FromStr for MusicalKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || Error::InvalidInput(format!("unrecognized key name: {:?}", s));

        let mut chars = trimmed.chars();
        let letter = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        if natural_pitch(letter).is_none() {
            return Err(invalid());
        }

        let rest = chars.as_str();
        let (accidental, suffix) = if let Some(r) = rest.strip_prefix('#').or_else(|| rest.strip_prefix('♯')) {
            (Sharp, r)
        } else if let Some(r) = rest.strip_prefix('b').or_else(|| rest.strip_prefix('♭')) {
            (Flat, r)
        } else {
            (Natural, rest)
        };

        let mode = match suffix.trim().to_ascii_lowercase().as_str() {
            "" | "maj" | "major" => Mode::Major,
            "m" | "min" | "minor" => Mode::Minor,
            _ => return Err(invalid()),
        };

        Ok(Self {
            letter,
            accidental,
            mode,
        })
    }
}

impl TryFrom<String> for MusicalKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MusicalKey> for String {
    fn from(key: MusicalKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_keys_round_trip_through_names() {
        for tonic in 0..12 {
            for mode in [Mode::Major, Mode::Minor] {
                let key = MusicalKey::new(tonic, mode);
                let parsed: MusicalKey = key.name().parse().unwrap();
                assert_eq!(parsed, key);
                assert_eq!(parsed.tonic(), tonic);
            }
        }
    }

    #[test]
    fn test_enharmonic_spellings_differ_but_sound_alike() {
        let a_sharp: MusicalKey = "A#".parse().unwrap();
        let b_flat: MusicalKey = "Bb".parse().unwrap();
        assert_ne!(a_sharp, b_flat);
        assert!(a_sharp.same_pitch(&b_flat));

        let g_flat_minor: MusicalKey = "Gbm".parse().unwrap();
        let f_sharp_minor: MusicalKey = "F#m".parse().unwrap();
        assert_ne!(g_flat_minor, f_sharp_minor);
        assert!(g_flat_minor.same_pitch(&f_sharp_minor));
        assert!(!f_sharp_minor.same_pitch(&"F#".parse().unwrap()));

        let c_flat: MusicalKey = "Cb".parse().unwrap();
        assert_eq!(c_flat.name(), "Cb");
        assert_eq!(c_flat.tonic(), 11);
    }

    #[test]
    fn test_spelling_variants_normalize() {
        let expected: MusicalKey = "Am".parse().unwrap();
        for spelling in ["Am", "A min", "a minor", "AMIN"] {
            assert_eq!(spelling.parse::<MusicalKey>().unwrap(), expected, "{}", spelling);
        }
        assert_eq!("C major".parse::<MusicalKey>().unwrap(), MusicalKey::new(0, Mode::Major));
        assert_eq!("F♯m".parse::<MusicalKey>().unwrap().name(), "F#m");
    }

    #[test]
    fn test_invalid_names_rejected() {
        for bad in ["", "H", "F#x", "m", "Cmajor7"] {
            assert!(bad.parse::<MusicalKey>().is_err(), "{:?} should not parse", bad);
        }
    }

    #[test]
    fn test_relative_keys() {
        let f_sharp_minor: MusicalKey = "F#m".parse().unwrap();
        assert_eq!(f_sharp_minor.relative().name(), "A");
        assert_eq!(f_sharp_minor.relative().relative(), f_sharp_minor);
    }

    #[test]
    fn test_serde_keeps_spelling() {
        let key: MusicalKey = "Bb".parse().unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"Bb\"");

        let parsed: MusicalKey = serde_json::from_str("\"A#\"").unwrap();
        assert_eq!(parsed.name(), "A#");
        assert!(parsed.same_pitch(&key));
        assert!(serde_json::from_str::<MusicalKey>("\"Q\"").is_err());
    }
}
