//! Final score aggregation
//!
//! Pure function of the sub-score set and the validated weights: weighted sum,
//! clipped to [0, 100], rounded to one decimal. No mutation, no randomness,
//! no ordering sensitivity; the same inputs always produce the same bits.

use crate::config::ScoreWeights;
use crate::types::{clamp_score, round_score, SubScoreSet};

/// Unrounded weighted sum of the six sub-scores
///
/// Exposed separately so the quality gates can subtract penalties and apply
/// caps before the final clamp-and-round.
pub fn weighted_sum(scores: &SubScoreSet, weights: &ScoreWeights) -> f64 {
    scores.content.value * weights.content
        + scores.delivery.value * weights.delivery
        + scores.communication.value * weights.communication
        + scores.voice.value * weights.voice
        + scores.confidence.value * weights.confidence
        + scores.structure.value * weights.structure
}

/// Combine six sub-scores into the final score
pub fn aggregate(scores: &SubScoreSet, weights: &ScoreWeights) -> f64 {
    round_score(clamp_score(weighted_sum(scores, weights)))
}
