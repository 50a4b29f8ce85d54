//! Transition candidate scoring
//!
//! Every catalog song is scored against the source song on three criteria
//! (tempo, key, artist) plus a jitter term, then the list is sorted by
//! descending score. The sort is stable: equal scores keep catalog order.

use serde::Serialize;
use std::fmt;
use tracing::debug;
use wedj_common::Song;

use crate::harmonic::{is_harmonic_match, HarmonicRule};
use crate::jitter::ScoreJitter;

/// BPM difference bands, tightest first: (max difference, reason)
const BPM_BANDS: [(f64, MatchReason); 3] = [
    (2.0, MatchReason::PerfectBpm),
    (5.0, MatchReason::CloseBpm),
    (10.0, MatchReason::CompatibleBpm),
];

/// Number of transitions shown by default
pub const DEFAULT_DISPLAY_LIMIT: usize = 6;

/// Why a candidate earned points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MatchReason {
    #[serde(rename = "Perfect BPM match")]
    PerfectBpm,
    #[serde(rename = "Close BPM")]
    CloseBpm,
    #[serde(rename = "Compatible BPM")]
    CompatibleBpm,
    #[serde(rename = "Same key")]
    SameKey,
    #[serde(rename = "Harmonic match")]
    HarmonicMatch,
    #[serde(rename = "Same artist")]
    SameArtist,
}

impl MatchReason {
    /// Points this criterion contributes
    pub fn points(&self) -> u32 {
        match self {
            MatchReason::PerfectBpm => 40,
            MatchReason::CloseBpm => 25,
            MatchReason::CompatibleBpm => 15,
            MatchReason::SameKey => 30,
            MatchReason::HarmonicMatch => 25,
            MatchReason::SameArtist => 20,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchReason::PerfectBpm => "Perfect BPM match",
            MatchReason::CloseBpm => "Close BPM",
            MatchReason::CompatibleBpm => "Compatible BPM",
            MatchReason::SameKey => "Same key",
            MatchReason::HarmonicMatch => "Harmonic match",
            MatchReason::SameArtist => "Same artist",
        }
    }
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A catalog song with its score against the source song
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub song: Song,
    pub match_score: u32,
    pub match_reasons: Vec<MatchReason>,
}

/// Criteria that fire for `candidate`, in evaluation order
pub fn match_reasons(source: &Song, candidate: &Song) -> Vec<MatchReason> {
    match_reasons_with(source, candidate, HarmonicRule::default())
}

/// [`match_reasons`] with an explicit harmonic rule
///
/// Under the classic rule "Same key" means the same key name. The Camelot
/// rule also counts enharmonic spellings as the same key.
pub fn match_reasons_with(source: &Song, candidate: &Song, rule: HarmonicRule) -> Vec<MatchReason> {
    let mut reasons = Vec::with_capacity(3);

    if let (Some(source_bpm), Some(candidate_bpm)) = (source.bpm, candidate.bpm) {
        let diff = (source_bpm - candidate_bpm).abs();
        if let Some((_, reason)) = BPM_BANDS.iter().find(|(max, _)| diff <= *max) {
            reasons.push(*reason);
        }
    }

    if let (Some(source_key), Some(candidate_key)) = (source.key, candidate.key) {
        let same_key = match rule {
            HarmonicRule::Classic => source_key == candidate_key,
            HarmonicRule::Camelot => source_key.same_pitch(&candidate_key),
        };
        if same_key {
            reasons.push(MatchReason::SameKey);
        } else if is_harmonic_match(rule, source_key, candidate_key) {
            reasons.push(MatchReason::HarmonicMatch);
        }
    }

    if source.artist == candidate.artist {
        reasons.push(MatchReason::SameArtist);
    }

    reasons
}

/// Score and rank every catalog song as a transition from `source`
///
/// Returns `catalog.len()` candidates, highest score first; ties keep
/// catalog order. One jitter value is drawn per candidate, in catalog order.
pub fn score_candidates(
    source: &Song,
    catalog: &[Song],
    jitter: &mut dyn ScoreJitter,
) -> Vec<ScoredCandidate> {
    score_candidates_with(source, catalog, HarmonicRule::default(), jitter)
}

/// [`score_candidates`] with an explicit harmonic rule
pub fn score_candidates_with(
    source: &Song,
    catalog: &[Song],
    rule: HarmonicRule,
    jitter: &mut dyn ScoreJitter,
) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = catalog
        .iter()
        .map(|candidate| {
            let match_reasons = match_reasons_with(source, candidate, rule);
            let base: u32 = match_reasons.iter().map(MatchReason::points).sum();
            ScoredCandidate {
                song: candidate.clone(),
                match_score: base + jitter.next_jitter(),
                match_reasons,
            }
        })
        .collect();

    // Vec::sort_by is stable
    scored.sort_by(|a, b| b.match_score.cmp(&a.match_score));

    debug!(
        source = %source.id,
        rule = ?rule,
        candidates = scored.len(),
        best = scored.first().map(|c| c.song.id.as_str()).unwrap_or("-"),
        "Scored transition candidates"
    );
    scored
}

/// Ranks transitions against a fixed catalog
pub struct TransitionScorer {
    catalog: Vec<Song>,
    display_limit: usize,
    rule: HarmonicRule,
}

impl TransitionScorer {
    pub fn new(catalog: Vec<Song>) -> Self {
        Self {
            catalog,
            display_limit: DEFAULT_DISPLAY_LIMIT,
            rule: HarmonicRule::default(),
        }
    }

    pub fn with_harmonic_rule(mut self, rule: HarmonicRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_display_limit(mut self, limit: usize) -> Self {
        self.display_limit = limit;
        self
    }

    pub fn catalog(&self) -> &[Song] {
        &self.catalog
    }

    /// Full ranking
    pub fn rank(&self, source: &Song, jitter: &mut dyn ScoreJitter) -> Vec<ScoredCandidate> {
        score_candidates_with(source, &self.catalog, self.rule, jitter)
    }

    /// Ranking truncated to the display limit
    pub fn top(&self, source: &Song, jitter: &mut dyn ScoreJitter) -> Vec<ScoredCandidate> {
        let mut ranked = self.rank(source, jitter);
        ranked.truncate(self.display_limit);
        ranked
    }
}
