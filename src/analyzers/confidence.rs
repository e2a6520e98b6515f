//! Confidence sub-score
//!
//! Text-derived confidence starts at a neutral baseline and moves with the
//! configured marker sets: assertive phrases ("I led", "I decided") add a
//! bonus each, hedging phrases ("I think", "maybe") subtract a penalty each.
//! When a voice-derived confidence channel is available the two blend 60/40;
//! without audio the text signal stands alone, so confidence is always
//! computable.

use crate::config::{CompiledLexicon, ConfidenceConfig};
use crate::types::{clamp_score, SubScore};

/// Score confidence from transcript markers and the optional voice channel
pub fn score_confidence(
    transcript: &str,
    voice_confidence: Option<f64>,
    lexicon: &CompiledLexicon,
    config: &ConfidenceConfig,
) -> SubScore {
    let assertive = lexicon.assertive.find_iter(transcript).count() as f64;
    let hedging = lexicon.hedging.find_iter(transcript).count() as f64;

    let text = clamp_score(
        config.baseline + assertive * config.assertive_bonus - hedging * config.hedging_penalty,
    );

    let (value, voice_component) = match voice_confidence {
        Some(voice) => {
            let voice = clamp_score(voice);
            (text * config.text_weight + voice * config.voice_weight, voice)
        }
        None => (text, 0.0),
    };

    let mut score = SubScore::computed(value)
        .with_measurement("assertive_markers", assertive)
        .with_measurement("hedging_markers", hedging)
        .with_measurement("text_confidence", text);
    if voice_confidence.is_some() {
        score = score.with_measurement("voice_confidence", voice_component);
    }
    score
}
