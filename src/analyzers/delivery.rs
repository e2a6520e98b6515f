//! Delivery sub-score
//!
//! Starts at 100 and subtracts two capped penalties: distance outside the
//! optimal WPM band (slow speech penalized harder than fast, per-WPM rates)
//! and detected filler words. Both penalties are strictly proportional, so
//! the score is monotonic: more fillers or a WPM further outside the band can
//! never raise it.

use crate::analyzers::LexicalFeatures;
use crate::config::DeliveryConfig;
use crate::types::SubScore;

/// Delivery score plus the pacing assessment used in feedback text
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    pub score: SubScore,
    pub assessment: String,
}

/// Score delivery from the lexical features
pub fn score_delivery(features: &LexicalFeatures, config: &DeliveryConfig) -> DeliveryOutcome {
    let pace_penalty = pace_penalty(features.wpm, config);
    let filler_penalty =
        (features.filler_total as f64 * config.filler_penalty).min(config.max_filler_penalty);

    let score = SubScore::computed(100.0 - pace_penalty - filler_penalty)
        .with_measurement("wpm", features.wpm)
        .with_measurement("filler_count", features.filler_total as f64)
        .with_measurement("pace_penalty", pace_penalty)
        .with_measurement("filler_penalty", filler_penalty);

    DeliveryOutcome {
        score,
        assessment: wpm_assessment(features.wpm, config).to_string(),
    }
}

/// Penalty for WPM outside the configured band, capped
fn pace_penalty(wpm: f64, config: &DeliveryConfig) -> f64 {
    let raw = if wpm < config.wpm_min {
        (config.wpm_min - wpm) * config.slow_penalty_per_wpm
    } else if wpm > config.wpm_max {
        (wpm - config.wpm_max) * config.fast_penalty_per_wpm
    } else {
        0.0
    };
    raw.min(config.max_pace_penalty)
}

/// Human-readable pacing assessment
pub fn wpm_assessment(wpm: f64, config: &DeliveryConfig) -> &'static str {
    if wpm < config.wpm_too_slow {
        "much too slow"
    } else if wpm < config.wpm_min {
        "slightly slow"
    } else if wpm <= config.wpm_max {
        "well paced"
    } else if wpm <= config.wpm_too_fast {
        "slightly fast"
    } else {
        "much too fast"
    }
}
