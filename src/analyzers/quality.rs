//! Quality gates
//!
//! Deterministic validation applied after the six sub-scores: a trivially
//! short answer, a repeated-word answer, or outright gibberish can land in
//! the optimal WPM band and graze a structure marker, so the weighted sum
//! alone would flatter it. Each tripped gate subtracts a penalty from the
//! weighted score; the worst gates also cap it. Penalties and caps apply
//! before final rounding and the report is carried on the record.

use crate::analyzers::LexicalFeatures;
use crate::config::QualityGateConfig;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Words short enough to ignore when measuring vocabulary breadth
const UNIQUE_WORD_MIN_LEN: usize = 3;

/// Word length counted as recognizable without a dictionary
const RECOGNIZED_WORD_MIN_LEN: usize = 4;

/// Result of running the quality gates
#[derive(Debug, Clone, Default)]
pub struct QualityReport {
    /// Human-readable description of each tripped gate
    pub issues: Vec<String>,
    /// Sum of all gate penalties
    pub total_penalty: f64,
    /// Hard ceiling on the final score, when a severe gate tripped
    pub score_cap: Option<f64>,
}

impl QualityReport {
    fn cap_at(&mut self, cap: f64) {
        self.score_cap = Some(match self.score_cap {
            Some(existing) => existing.min(cap),
            None => cap,
        });
    }

    fn penalize(&mut self, issue: &str, penalty: f64) {
        self.issues.push(issue.to_string());
        self.total_penalty += penalty;
    }
}

/// Run all quality gates over one answer
///
/// `relevance` is the raw similarity to the reference answer in [0, 1], when
/// one was computed; `structure_score` is the STAR sub-score value.
pub fn apply_quality_gates(
    transcript: &str,
    features: &LexicalFeatures,
    relevance: Option<f64>,
    structure_score: f64,
    config: &QualityGateConfig,
) -> QualityReport {
    let mut report = QualityReport::default();
    let word_count = features.word_count;

    if word_count < config.min_word_count {
        report.penalize(
            "Answer too short - provide more detail",
            config.short_answer_penalty,
        );
        if word_count < config.very_short_word_count {
            report.cap_at(config.cap_very_short);
        } else {
            report.cap_at(config.cap_short);
        }
    }

    let unique_words: std::collections::HashSet<String> = transcript
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|w| w.len() > UNIQUE_WORD_MIN_LEN - 1)
        .collect();
    if unique_words.len() < config.min_unique_words {
        report.penalize(
            "Limited vocabulary - use more varied words",
            config.low_vocabulary_penalty,
        );
    }

    if word_count > 0 {
        let filler_ratio = features.filler_total as f64 / word_count as f64;
        if filler_ratio > config.max_filler_ratio {
            report.penalize(
                "Too many filler words - practice speaking clearly",
                config.filler_ratio_penalty,
            );
        }
    }

    if let Some(similarity) = relevance {
        if similarity < config.min_relevance {
            report.penalize(
                "Answer does not address the question",
                config.off_topic_penalty,
            );
            report.cap_at(config.cap_off_topic);
        }
    }

    if word_count > 10 {
        if let Some(repetition) = repetition_ratio(transcript) {
            if repetition > config.max_repetition {
                report.penalize(
                    "Avoid repeating the same phrases",
                    config.repetition_penalty,
                );
            }
        }
    }

    if let Some(reason) = detect_nonsense(transcript) {
        report.penalize(
            &format!("Answer appears to be nonsense: {}", reason),
            config.nonsense_penalty,
        );
        report.cap_at(config.cap_nonsense);
    }

    if structure_score < config.min_structure_score {
        report.cap_at(config.cap_no_structure);
    }

    report
}

/// Share of the distinct vocabulary taken by the most frequent word
///
/// Only words longer than three characters participate; None when there are
/// none.
fn repetition_ratio(transcript: &str) -> Option<f64> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in transcript
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|w| w.len() > 3)
    {
        *counts.entry(word).or_insert(0) += 1;
    }
    let max = counts.values().copied().max()?;
    Some(max as f64 / counts.len() as f64)
}

fn test_pattern_matcher() -> &'static regex::Regex {
    static MATCHER: OnceLock<regex::Regex> = OnceLock::new();
    MATCHER.get_or_init(|| {
        regex::Regex::new(r"\b(?:asdf|qwerty|lorem|ipsum|blah|testing|test|hello|hi|hey)\b")
            .expect("static pattern")
    })
}

fn short_word_run_matcher() -> &'static regex::Regex {
    static MATCHER: OnceLock<regex::Regex> = OnceLock::new();
    MATCHER
        .get_or_init(|| regex::Regex::new(r"\b(?:\w{1,2}\s+){5,}").expect("static pattern"))
}

/// Small recognizer set for gibberish detection; longer words pass on length
const COMMON_WORDS: &[&str] = &[
    "i", "the", "a", "an", "and", "or", "but", "is", "are", "was", "were", "had", "has",
    "have", "do", "did", "will", "can", "may", "my", "our", "your", "their", "this",
    "that", "it", "he", "she", "we", "they", "you", "me", "us", "to", "for", "with",
    "by", "from", "at", "in", "on", "of", "as", "so", "if", "then", "not", "no", "yes",
    "all", "any", "get", "go", "see", "use", "now", "how", "who", "what", "when", "why",
];

/// Detect gibberish or test input; returns the reason when two or more
/// independent signals fire
fn detect_nonsense(transcript: &str) -> Option<String> {
    let trimmed = transcript.trim();
    if trimmed.len() < 5 {
        return Some("input too short".to_string());
    }

    let lower = trimmed.to_lowercase();
    let mut signals: Vec<String> = Vec::new();

    if let Some(hit) = test_pattern_matcher().find(&lower) {
        signals.push(format!("test pattern '{}'", hit.as_str()));
    }
    if has_character_run(&lower, 5) {
        signals.push("repeated character run".to_string());
    }
    if short_word_run_matcher().is_match(&lower) {
        signals.push("run of one-to-two letter words".to_string());
    }

    let words: Vec<&str> = lower.split_whitespace().collect();
    if words.len() > 5 {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for word in &words {
            *counts.entry(word).or_insert(0) += 1;
        }
        if let Some(max) = counts.values().copied().max() {
            if max as f64 / words.len() as f64 > 0.3 {
                signals.push(format!("one word repeated {} times", max));
            }
        }
    }

    if words.len() > 10 {
        let recognized = words
            .iter()
            .filter(|w| w.len() >= RECOGNIZED_WORD_MIN_LEN || COMMON_WORDS.contains(w))
            .count();
        if (recognized as f64 / words.len() as f64) < 0.3 {
            signals.push("low word recognition ratio".to_string());
        }
    }

    if signals.len() >= 2 {
        Some(signals.join(", "))
    } else {
        None
    }
}

/// True when any character repeats `run_len` or more times consecutively
fn has_character_run(text: &str, run_len: usize) -> bool {
    let mut previous = None;
    let mut run = 0;
    for c in text.chars() {
        if Some(c) == previous {
            run += 1;
            if run >= run_len {
                return true;
            }
        } else {
            previous = Some(c);
            run = 1;
        }
    }
    false
}
