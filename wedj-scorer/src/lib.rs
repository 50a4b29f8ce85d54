//! # WE-DJ Transition Scorer
//!
//! Ranks catalog songs as transitions out of a source song, by tempo
//! proximity, harmonic key compatibility and shared artist.
//!
//! ```
//! use wedj_scorer::{catalog::demo_catalog, score_candidates, NoJitter};
//!
//! let catalog = demo_catalog();
//! let source = &catalog[0];
//! let ranked = score_candidates(source, &catalog, &mut NoJitter);
//! assert_eq!(ranked.len(), catalog.len());
//! assert!(ranked[0].match_score >= ranked[1].match_score);
//! ```

pub mod catalog;
pub mod harmonic;
pub mod jitter;
pub mod scorer;

pub use harmonic::{harmonic_matches, is_harmonic_match, CamelotCode, HarmonicRule};
pub use jitter::{NoJitter, RandomJitter, ScoreJitter, SeededJitter, JITTER_RANGE};
pub use scorer::{
    match_reasons, match_reasons_with, score_candidates, score_candidates_with, MatchReason,
    ScoredCandidate, TransitionScorer, DEFAULT_DISPLAY_LIMIT,
};
