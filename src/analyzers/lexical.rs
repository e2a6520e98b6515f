//! Lexical feature extraction
//!
//! Deterministic text measurements shared by the downstream analyzers:
//! word count, words per minute, filler occurrences, sentence splitting, and
//! the normalized content-word stream used for diversity and keyword checks.
//!
//! Filler counting runs the lexicon's single longest-first alternation over
//! the transcript, so "kind of" is one filler hit and never additionally
//! counted as any shorter overlapping entry.

use crate::config::CompiledLexicon;
use crate::types::FillerCount;
use std::collections::BTreeMap;

/// Measurements extracted once per submission
#[derive(Debug, Clone)]
pub struct LexicalFeatures {
    pub word_count: usize,
    pub wpm: f64,
    pub filler_total: u32,
    /// Per-phrase filler counts, sorted by count descending then phrase
    pub fillers: Vec<FillerCount>,
}

/// Extract lexical features from a transcript
///
/// An empty transcript yields all zeros; stricter handling of empty input is
/// the pipeline's concern, not this extractor's.
pub fn extract(transcript: &str, duration_seconds: f64, lexicon: &CompiledLexicon) -> LexicalFeatures {
    let word_count = word_count(transcript);
    let wpm = words_per_minute(word_count, duration_seconds);
    let fillers = count_fillers(transcript, lexicon);
    let filler_total = fillers.iter().map(|f| f.count).sum();

    LexicalFeatures {
        word_count,
        wpm,
        filler_total,
        fillers,
    }
}

/// Whitespace-delimited word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Words per minute; zero for empty text or non-positive duration
pub fn words_per_minute(word_count: usize, duration_seconds: f64) -> f64 {
    if word_count == 0 || duration_seconds <= 0.0 {
        return 0.0;
    }
    word_count as f64 / (duration_seconds / 60.0)
}

/// Count filler occurrences per phrase
pub fn count_fillers(text: &str, lexicon: &CompiledLexicon) -> Vec<FillerCount> {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for hit in lexicon.fillers.find_iter(text) {
        *counts.entry(hit.as_str().to_lowercase()).or_insert(0) += 1;
    }
    let mut fillers: Vec<FillerCount> = counts
        .into_iter()
        .map(|(phrase, count)| FillerCount { phrase, count })
        .collect();
    fillers.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.phrase.cmp(&b.phrase)));
    fillers
}

/// Split a transcript into sentences on terminal punctuation
///
/// Transcripts from speech-to-text are loosely punctuated; unterminated
/// trailing text still counts as a sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Lowercased alphanumeric-trimmed words of at least `min_len` characters
pub fn content_words(text: &str, min_len: usize) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| w.len() >= min_len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarkerLexicon;

    fn lexicon() -> CompiledLexicon {
        MarkerLexicon::default().compile().unwrap()
    }

    #[test]
    fn test_wpm_computation() {
        // 150 words over 60 seconds is exactly 150 WPM
        assert_eq!(words_per_minute(150, 60.0), 150.0);
        assert_eq!(words_per_minute(75, 30.0), 150.0);
    }

    #[test]
    fn test_empty_transcript_yields_zeros() {
        let features = extract("", 45.0, &lexicon());
        assert_eq!(features.word_count, 0);
        assert_eq!(features.wpm, 0.0);
        assert_eq!(features.filler_total, 0);
        assert!(features.fillers.is_empty());
    }

    #[test]
    fn test_filler_counting_is_case_insensitive() {
        let features = extract("Um, I think, um, we basically shipped it. UM.", 30.0, &lexicon());
        let um = features.fillers.iter().find(|f| f.phrase == "um").unwrap();
        assert_eq!(um.count, 3);
        let basically = features.fillers.iter().find(|f| f.phrase == "basically").unwrap();
        assert_eq!(basically.count, 1);
    }

    #[test]
    fn test_overlapping_phrases_counted_once() {
        // "sort of" must match as the phrase, not twice via shorter entries
        let fillers = count_fillers("it was sort of finished", &lexicon());
        assert_eq!(fillers.len(), 1);
        assert_eq!(fillers[0].phrase, "sort of");
        assert_eq!(fillers[0].count, 1);
    }

    #[test]
    fn test_whole_word_matching() {
        // "umbrella" contains "um" but is not a filler
        let fillers = count_fillers("the umbrella summary", &lexicon());
        assert!(fillers.is_empty());
    }

    #[test]
    fn test_sentence_splitting() {
        let sentences = split_sentences("First part. Second part! Was it third? trailing tail");
        assert_eq!(
            sentences,
            vec!["First part", "Second part", "Was it third", "trailing tail"]
        );
    }

    #[test]
    fn test_content_words_filter() {
        let words = content_words("I led a big migration, and it worked.", 3);
        assert_eq!(words, vec!["led", "big", "migration", "and", "worked"]);
    }
}
