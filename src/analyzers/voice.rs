//! Voice sub-score adapter
//!
//! Maps aggregated audio statistics onto a 0-100 expressiveness score. With
//! no audio summary the score is the configured neutral default; that is the
//! documented text-only behavior, not a degradation. With audio, pitch
//! variation (standard deviation in Hz) is scored on a piecewise curve that
//! rewards the expressive-but-not-erratic band, energy projection is a linear
//! ramp over mean dB, and the two blend 60/40.

use crate::config::VoiceConfig;
use crate::types::{clamp_score, AudioSummary, SubScore};

/// Voice score plus the derived confidence channel fed to the confidence analyzer
#[derive(Debug, Clone)]
pub struct VoiceOutcome {
    pub score: SubScore,
    /// Voice-derived confidence in [0, 100]; None without audio
    pub voice_confidence: Option<f64>,
}

/// Score vocal expressiveness from the optional audio summary
pub fn score_voice(audio: Option<&AudioSummary>, config: &VoiceConfig) -> VoiceOutcome {
    let Some(summary) = audio else {
        return VoiceOutcome {
            score: SubScore::computed(config.neutral_score)
                .with_measurement("neutral_default", 1.0),
            voice_confidence: None,
        };
    };

    let pitch = pitch_variation_score(summary.pitch_std_hz, config);
    let energy = energy_score(summary.energy_mean_db, config);
    let value = pitch * config.pitch_weight + energy * config.energy_weight;

    // Projection dominates the confidence channel; steadiness refines it
    let voice_confidence = clamp_score(energy * 0.6 + pitch * 0.4);

    let score = SubScore::computed(value)
        .with_measurement("pitch_std_hz", summary.pitch_std_hz)
        .with_measurement("pitch_score", pitch)
        .with_measurement("energy_mean_db", summary.energy_mean_db)
        .with_measurement("energy_score", energy);

    VoiceOutcome {
        score,
        voice_confidence: Some(voice_confidence),
    }
}

/// Piecewise pitch-variation curve
///
/// Monotone delivery (std below the monotone threshold) scores low, the
/// optimal band scores 90-100, and overly dramatic variation tapers back
/// down. The curve is continuous across every breakpoint.
pub fn pitch_variation_score(pitch_std: f64, config: &VoiceConfig) -> f64 {
    let std = pitch_std.max(0.0);
    let value = if std <= config.pitch_std_monotone {
        30.0 + (std / config.pitch_std_monotone) * 20.0
    } else if std <= config.pitch_std_optimal_min {
        let span = config.pitch_std_optimal_min - config.pitch_std_monotone;
        50.0 + (std - config.pitch_std_monotone) / span * 40.0
    } else if std <= config.pitch_std_optimal_max {
        let span = config.pitch_std_optimal_max - config.pitch_std_optimal_min;
        90.0 + (std - config.pitch_std_optimal_min) / span * 10.0
    } else if std <= config.pitch_std_dramatic {
        let span = config.pitch_std_dramatic - config.pitch_std_optimal_max;
        100.0 - (std - config.pitch_std_optimal_max) / span * 30.0
    } else {
        70.0 - (std - config.pitch_std_dramatic) * 0.5
    };
    clamp_score(value)
}

/// Linear ramp from the floor dB (score 0) to the full-score dB (score 100)
pub fn energy_score(energy_mean_db: f64, config: &VoiceConfig) -> f64 {
    let span = config.energy_db_full - config.energy_db_floor;
    clamp_score((energy_mean_db - config.energy_db_floor) / span * 100.0)
}
