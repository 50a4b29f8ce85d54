//! Harmonic mixing compatibility
//!
//! Two rules are available. [`HarmonicRule::Classic`] is a short fixed table
//! of well-known pairs, matched on the exact key spelling; source keys outside
//! the table have no harmonic partners. [`HarmonicRule::Camelot`] places keys
//! on the Camelot wheel: 12 positions a fifth apart, "A" for minor and "B"
//! for major, with relative keys sharing a number. From any source key a DJ
//! can move to the relative key, one fifth up or down, or the diagonal
//! neighbour (minor n to major n-1, major n to minor n+1).

use std::fmt;
use wedj_common::{Mode, MusicalKey};

/// Pitch class of Camelot position 1 (G#m = 1A, B = 1B)
const MINOR_ORIGIN: i32 = 8;
const MAJOR_ORIGIN: i32 = 11;

/// Position on the Camelot wheel, e.g. `11A` for F#m
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CamelotCode {
    /// 1-12
    pub number: u8,
    pub mode: Mode,
}

impl CamelotCode {
    pub fn of(key: MusicalKey) -> Self {
        let origin = match key.mode() {
            Mode::Minor => MINOR_ORIGIN,
            Mode::Major => MAJOR_ORIGIN,
        };
        // A fifth is 7 semitones and 7 * 7 = 49 = 1 (mod 12)
        let steps = ((key.tonic() as i32 - origin) * 7).rem_euclid(12);
        Self {
            number: steps as u8 + 1,
            mode: key.mode(),
        }
    }

    pub fn key(&self) -> MusicalKey {
        let origin = match self.mode {
            Mode::Minor => MINOR_ORIGIN,
            Mode::Major => MAJOR_ORIGIN,
        };
        let tonic = (origin + (self.number as i32 - 1) * 7).rem_euclid(12);
        MusicalKey::new(tonic as u8, self.mode)
    }

    /// Move around the wheel, wrapping 12 -> 1
    fn step(&self, delta: i32) -> Self {
        let number = (self.number as i32 - 1 + delta).rem_euclid(12) + 1;
        Self {
            number: number as u8,
            mode: self.mode,
        }
    }

    fn with_mode(&self, mode: Mode) -> Self {
        Self {
            number: self.number,
            mode,
        }
    }
}

impl fmt::Display for CamelotCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self.mode {
            Mode::Minor => 'A',
            Mode::Major => 'B',
        };
        write!(f, "{}{}", self.number, letter)
    }
}

/// Source key -> its harmonic partners, by exact key name
const CLASSIC_TABLE: [(&str, [&str; 3]); 3] = [
    ("F#m", ["A", "C#m", "D"]),
    ("C#m", ["E", "F#m", "A"]),
    ("G", ["Em", "C", "D"]),
];

/// Which compatibility table the scorer consults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HarmonicRule {
    /// Fixed three-entry table, exact spelling
    #[default]
    Classic,
    /// Full Camelot wheel, any enharmonic spelling
    Camelot,
}

fn camelot_matches(source: MusicalKey) -> [MusicalKey; 4] {
    let code = CamelotCode::of(source);
    let diagonal = match source.mode() {
        Mode::Minor => code.step(-1).with_mode(Mode::Major),
        Mode::Major => code.step(1).with_mode(Mode::Minor),
    };
    [
        source.relative(),
        code.step(1).key(),
        code.step(-1).key(),
        diagonal.key(),
    ]
}

/// Keys that mix harmonically with `source` (excluding `source` itself)
pub fn harmonic_matches(rule: HarmonicRule, source: MusicalKey) -> Vec<MusicalKey> {
    match rule {
        HarmonicRule::Classic => {
            let name = source.name();
            CLASSIC_TABLE
                .iter()
                .find(|(from, _)| *from == name)
                .map(|(_, partners)| partners.iter().filter_map(|p| p.parse().ok()).collect())
                .unwrap_or_default()
        }
        HarmonicRule::Camelot => camelot_matches(source).to_vec(),
    }
}

/// Whether `candidate` is a harmonic partner of `source` under `rule`
pub fn is_harmonic_match(rule: HarmonicRule, source: MusicalKey, candidate: MusicalKey) -> bool {
    match rule {
        HarmonicRule::Classic => harmonic_matches(rule, source).contains(&candidate),
        HarmonicRule::Camelot => camelot_matches(source)
            .iter()
            .any(|key| key.same_pitch(&candidate)),
    }
}
