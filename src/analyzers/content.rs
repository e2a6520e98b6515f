//! Content sub-score
//!
//! Semantic similarity of the answer to the reference answer, blended 70/30
//! with keyword coverage. Keyword matching is case-insensitive with a short
//! stem rule: a keyword counts as covered when a transcript word equals it or
//! shares its first four characters ("optimized" covers "optimization").
//!
//! Degradation ladder: no reference answer or a similarity failure drops to
//! keyword-only scoring with the degraded flag set; no keywords either means
//! a zero, degraded. A similarity result from a non-semantic provider (the
//! word-overlap stand-in) still blends but keeps the degraded flag.

use crate::analyzers::lexical;
use crate::collaborators::TimedSimilarity;
use crate::config::ContentConfig;
use crate::types::{KeywordCoverage, SubScore};
use std::collections::HashSet;
use tracing::warn;

/// Minimum word length participating in keyword matching
const KEYWORD_MIN_WORD_LEN: usize = 3;

/// Stem-prefix length for approximate keyword matches
const KEYWORD_STEM_LEN: usize = 4;

/// Content score plus the keyword coverage detail for the record
#[derive(Debug, Clone)]
pub struct ContentOutcome {
    pub score: SubScore,
    pub coverage: KeywordCoverage,
    /// Raw similarity to the reference answer in [0, 1], when one was computed
    pub similarity: Option<f64>,
}

/// Score content relevance
pub async fn score_content(
    transcript: &str,
    reference_answer: &str,
    keywords: &[String],
    similarity: Option<&TimedSimilarity<'_>>,
    config: &ContentConfig,
) -> ContentOutcome {
    let coverage = match_keywords(transcript, keywords);
    let keyword_score = if keywords.is_empty() {
        None
    } else {
        Some(coverage.found.len() as f64 / keywords.len() as f64 * 100.0)
    };

    let mut semantic = true;
    let similarity_raw = match (reference_answer.trim().is_empty(), similarity) {
        (true, _) | (false, None) => None,
        (false, Some(provider)) => match provider.similarity(transcript, reference_answer).await {
            Ok(sim) => {
                semantic = provider.semantic();
                Some(sim.clamp(0.0, 1.0))
            }
            Err(e) => {
                warn!(provider = provider.name(), "Similarity collaborator failed: {}", e);
                None
            }
        },
    };
    let similarity_score = similarity_raw.map(|sim| sim * 100.0);

    let score = match (similarity_score, keyword_score) {
        (Some(sim), Some(kw)) => {
            let blended = sim * config.similarity_weight + kw * config.keyword_weight;
            let score = if semantic {
                SubScore::computed(blended)
            } else {
                SubScore::degraded(blended)
            };
            score
                .with_measurement("similarity", sim)
                .with_measurement("keyword_coverage", kw)
        }
        (Some(sim), None) => {
            let score = if semantic {
                SubScore::computed(sim)
            } else {
                SubScore::degraded(sim)
            };
            score.with_measurement("similarity", sim)
        }
        (None, Some(kw)) => SubScore::degraded(kw).with_measurement("keyword_coverage", kw),
        (None, None) => SubScore::degraded(0.0),
    };

    ContentOutcome {
        score,
        coverage,
        similarity: similarity_raw,
    }
}

/// Case-insensitive keyword coverage with the four-character stem rule
pub fn match_keywords(transcript: &str, keywords: &[String]) -> KeywordCoverage {
    let words: HashSet<String> = lexical::content_words(transcript, KEYWORD_MIN_WORD_LEN)
        .into_iter()
        .collect();
    let stems: HashSet<&str> = words.iter().filter_map(|w| stem(w)).collect();

    let mut coverage = KeywordCoverage::default();
    for keyword in keywords {
        let lower = keyword.to_lowercase();
        let hit = words.contains(&lower)
            || stem(&lower).is_some_and(|s| stems.contains(s));
        if hit {
            coverage.found.push(keyword.clone());
        } else {
            coverage.missing.push(keyword.clone());
        }
    }
    coverage
}

/// First four characters; None for shorter words or non-boundary slices
fn stem(word: &str) -> Option<&str> {
    if word.chars().count() < KEYWORD_STEM_LEN {
        return None;
    }
    word.get(..KEYWORD_STEM_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{LexicalSimilarity, SimilarityProvider};
    use crate::error::CollaboratorError;
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedSimilarity(f64);

    #[async_trait]
    impl SimilarityProvider for FixedSimilarity {
        async fn similarity(&self, _: &str, _: &str) -> Result<f64, CollaboratorError> {
            Ok(self.0)
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct FailingSimilarity;

    #[async_trait]
    impl SimilarityProvider for FailingSimilarity {
        async fn similarity(&self, _: &str, _: &str) -> Result<f64, CollaboratorError> {
            Err(CollaboratorError::Network("connection refused".to_string()))
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_keyword_stem_matching() {
        let coverage = match_keywords(
            "we optimized the caching layer and monitored latency",
            &kw(&["optimization", "caching", "alerting"]),
        );
        assert_eq!(coverage.found, kw(&["optimization", "caching"]));
        assert_eq!(coverage.missing, kw(&["alerting"]));
    }

    #[test]
    fn test_keyword_matching_case_insensitive() {
        let coverage = match_keywords("Used Kubernetes for orchestration", &kw(&["kubernetes"]));
        assert_eq!(coverage.found.len(), 1);
    }

    #[tokio::test]
    async fn test_blend_weights_applied() {
        let provider = FixedSimilarity(0.9);
        let timed = TimedSimilarity::new(&provider, Duration::from_secs(5));
        let outcome = score_content(
            "we used caching to speed it up",
            "describe a caching strategy",
            &kw(&["caching", "sharding"]),
            Some(&timed),
            &ContentConfig::default(),
        )
        .await;
        // similarity 90 * 0.7 + coverage 50 * 0.3
        assert_eq!(outcome.score.value, 78.0);
        assert!(!outcome.score.degraded);
        assert_eq!(outcome.similarity, Some(0.9));
    }

    #[tokio::test]
    async fn test_word_overlap_stand_in_scores_but_stays_degraded() {
        let provider = LexicalSimilarity;
        let timed = TimedSimilarity::new(&provider, Duration::from_secs(5));
        let outcome = score_content(
            "we used caching to speed it up",
            "we used caching to speed it up",
            &kw(&["caching"]),
            Some(&timed),
            &ContentConfig::default(),
        )
        .await;
        assert_eq!(outcome.similarity, Some(1.0));
        assert!(
            outcome.score.degraded,
            "Word-overlap similarity is lower confidence than an embedding model"
        );
    }

    #[tokio::test]
    async fn test_empty_reference_falls_back_to_keywords() {
        let provider = FixedSimilarity(0.9);
        let timed = TimedSimilarity::new(&provider, Duration::from_secs(5));
        let outcome = score_content(
            "we used caching to speed it up",
            "",
            &kw(&["caching"]),
            Some(&timed),
            &ContentConfig::default(),
        )
        .await;
        assert_eq!(outcome.score.value, 100.0);
        assert!(outcome.score.degraded, "Keyword-only scoring is lower confidence");
    }

    #[tokio::test]
    async fn test_collaborator_failure_falls_back_to_keywords() {
        let provider = FailingSimilarity;
        let timed = TimedSimilarity::new(&provider, Duration::from_secs(5));
        let outcome = score_content(
            "we used caching to speed it up",
            "describe a caching strategy",
            &kw(&["caching", "sharding"]),
            Some(&timed),
            &ContentConfig::default(),
        )
        .await;
        assert_eq!(outcome.score.value, 50.0);
        assert!(outcome.score.degraded);
    }

    #[tokio::test]
    async fn test_no_signals_is_zero_degraded() {
        let outcome =
            score_content("some answer text", "", &[], None, &ContentConfig::default()).await;
        assert_eq!(outcome.score.value, 0.0);
        assert!(outcome.score.degraded);
    }
}
