//! Communication sub-score
//!
//! Blend of five factors: grammar correctness (from the grammar
//! collaborator), vocabulary diversity (type-token ratio over content words),
//! an average-sentence-length heuristic, coherence (distinct transition
//! words, indicating organized flow), and professional vocabulary (action
//! verbs and business terms matched by stem). When the grammar collaborator
//! is unavailable the blend renormalizes over the four text-local components
//! and the sub-score is flagged degraded.

use crate::analyzers::lexical;
use crate::collaborators::GrammarCheck;
use crate::config::{CommunicationConfig, CompiledLexicon};
use crate::types::{clamp_score, SubScore};
use std::collections::BTreeSet;

/// Score below which the diversity TTR map never drops for short answers
const SHORT_ANSWER_DIVERSITY: f64 = 50.0;

/// Penalty per word of average sentence length outside the optimal band
const SHORT_SENTENCE_PENALTY: f64 = 5.0;
const LONG_SENTENCE_PENALTY: f64 = 3.0;

/// Communication score plus an optional sentence-structure note
#[derive(Debug, Clone)]
pub struct CommunicationOutcome {
    pub score: SubScore,
    pub note: Option<String>,
}

/// Score communication quality
///
/// `grammar` is `None` when the collaborator was unavailable or timed out;
/// the caller has already logged the failure.
pub fn score_communication(
    transcript: &str,
    grammar: Option<&GrammarCheck>,
    lexicon: &CompiledLexicon,
    config: &CommunicationConfig,
) -> CommunicationOutcome {
    let diversity = diversity_score(transcript, config);
    let avg_sentence_len = average_sentence_length(transcript);
    let sentence = sentence_score(avg_sentence_len, config);

    let word_count = lexical::word_count(transcript);
    let transition_count = distinct_matches(&lexicon.transitions, transcript);
    let professional_count = distinct_matches(&lexicon.professional, transcript);
    let coherence = coherence_score(transition_count, word_count, config);
    let professional = professional_score(professional_count, word_count, config);

    let local = diversity * config.diversity_weight
        + sentence * config.sentence_weight
        + coherence * config.coherence_weight
        + professional * config.professional_weight;

    let (value, degraded, grammar_errors) = match grammar {
        Some(check) => {
            let penalty = (check.error_count as f64 * config.grammar_penalty_per_error)
                .min(config.max_grammar_penalty);
            let grammar_component = 100.0 - penalty;
            (
                grammar_component * config.grammar_weight + local,
                false,
                check.error_count as f64,
            )
        }
        None => {
            // Renormalize over the text-local components
            let local_weight = 1.0 - config.grammar_weight;
            (local / local_weight, true, 0.0)
        }
    };

    let mut score = if degraded {
        SubScore::degraded(value)
    } else {
        SubScore::computed(value)
    };
    score = score
        .with_measurement("diversity_score", diversity)
        .with_measurement("sentence_score", sentence)
        .with_measurement("avg_sentence_length", avg_sentence_len)
        .with_measurement("coherence_score", coherence)
        .with_measurement("transition_count", transition_count as f64)
        .with_measurement("professional_score", professional)
        .with_measurement("professional_count", professional_count as f64);
    if !degraded {
        score = score.with_measurement("grammar_errors", grammar_errors);
    }

    let note = sentence_note(avg_sentence_len, config);
    CommunicationOutcome { score, note }
}

/// Number of distinct marker matches (each phrase counted once)
fn distinct_matches(markers: &regex::Regex, transcript: &str) -> usize {
    let found: BTreeSet<String> = markers
        .find_iter(transcript)
        .map(|m| m.as_str().to_lowercase())
        .collect();
    found.len()
}

/// Vocabulary diversity via type-token ratio, mapped piecewise onto [0, 100]
pub fn diversity_score(transcript: &str, config: &CommunicationConfig) -> f64 {
    let words = lexical::content_words(transcript, 3);
    if words.len() < config.min_words_for_diversity {
        return SHORT_ANSWER_DIVERSITY;
    }
    let unique: std::collections::HashSet<&String> = words.iter().collect();
    let ttr = unique.len() as f64 / words.len() as f64;

    let value = if ttr >= config.ttr_excellent {
        85.0 + (ttr - config.ttr_excellent) * 100.0
    } else if ttr >= config.ttr_good {
        70.0 + (ttr - config.ttr_good) / (config.ttr_excellent - config.ttr_good) * 15.0
    } else if ttr >= config.ttr_poor {
        40.0 + (ttr - config.ttr_poor) / (config.ttr_good - config.ttr_poor) * 30.0
    } else {
        ttr / config.ttr_poor * 40.0
    };
    clamp_score(value)
}

/// Coherence from distinct transition usage
///
/// Stepped bands: five or more distinct transitions is excellent, none at
/// all bottoms out at 40. Answers below the analysis minimum score zero; the
/// short-answer quality gate handles those separately.
pub fn coherence_score(
    transition_count: usize,
    word_count: usize,
    config: &CommunicationConfig,
) -> f64 {
    if word_count < config.min_words_for_analysis {
        return 0.0;
    }
    let n = transition_count as f64;
    let value = if transition_count >= 5 {
        90.0 + ((n - 5.0) * 2.0).min(10.0)
    } else if transition_count >= 3 {
        75.0 + (n - 3.0) * 7.5
    } else if transition_count >= 1 {
        50.0 + (n - 1.0) * 12.5
    } else {
        40.0
    };
    clamp_score(value)
}

/// Professional vocabulary usage from distinct stem matches
pub fn professional_score(
    professional_count: usize,
    word_count: usize,
    config: &CommunicationConfig,
) -> f64 {
    if word_count < config.min_words_for_analysis {
        return 0.0;
    }
    let n = professional_count as f64;
    let value = if professional_count >= 6 {
        90.0 + ((n - 6.0) * 2.0).min(10.0)
    } else if professional_count >= 4 {
        75.0 + (n - 4.0) * 7.5
    } else if professional_count >= 2 {
        55.0 + (n - 2.0) * 10.0
    } else if professional_count == 1 {
        45.0
    } else {
        35.0
    };
    clamp_score(value)
}

fn average_sentence_length(transcript: &str) -> f64 {
    let sentences = lexical::split_sentences(transcript);
    if sentences.is_empty() {
        return 0.0;
    }
    let total_words: usize = sentences.iter().map(|s| lexical::word_count(s)).sum();
    total_words as f64 / sentences.len() as f64
}

/// Sentence-length heuristic: 100 inside the optimal band, linear falloff outside
fn sentence_score(avg_len: f64, config: &CommunicationConfig) -> f64 {
    let value = if avg_len < config.sentence_len_optimal_min {
        100.0 - (config.sentence_len_optimal_min - avg_len) * SHORT_SENTENCE_PENALTY
    } else if avg_len > config.sentence_len_optimal_max {
        100.0 - (avg_len - config.sentence_len_optimal_max) * LONG_SENTENCE_PENALTY
    } else {
        100.0
    };
    clamp_score(value)
}

fn sentence_note(avg_len: f64, config: &CommunicationConfig) -> Option<String> {
    if avg_len > 0.0 && avg_len < config.sentence_len_min {
        Some(format!(
            "Sentences average {:.0} words; try developing ideas more fully",
            avg_len
        ))
    } else if avg_len > config.sentence_len_max {
        Some(format!(
            "Sentences average {:.0} words; shorter sentences are easier to follow",
            avg_len
        ))
    } else {
        None
    }
}
