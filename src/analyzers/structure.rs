//! STAR structure detection
//!
//! Resolves the four STAR slots (situation, task, action, result) against the
//! transcript. A marker-phrase hit resolves a slot as Present; failing that,
//! the earliest sentence whose similarity to the slot's exemplar clears the
//! configured threshold resolves it as Partial. The earliest sufficient
//! sentence always wins; sentence order is the tie-break, not match strength,
//! which keeps resolutions independent of collaborator score jitter.

use crate::collaborators::TimedSimilarity;
use crate::config::{CompiledLexicon, StructureConfig};
use crate::types::{SlotPresence, SlotResolution, StarAnalysis, SubScore};
use regex::Regex;
use tracing::warn;

/// Structure analysis plus its sub-score
#[derive(Debug, Clone)]
pub struct StructureOutcome {
    pub star: StarAnalysis,
    pub score: SubScore,
}

/// Analyze STAR structure and score it
///
/// `similarity` is `None` when no embedding collaborator is configured; slots
/// then resolve by markers alone, which is the primary signal and not a
/// degradation. A mid-flight collaborator failure abandons semantic checks
/// for the remaining slots and flags the sub-score degraded.
pub async fn analyze_structure(
    sentences: &[&str],
    lexicon: &CompiledLexicon,
    config: &StructureConfig,
    similarity: Option<&TimedSimilarity<'_>>,
) -> StructureOutcome {
    let slots = [
        (&lexicon.star_situation, config.situation_exemplar.as_str()),
        (&lexicon.star_task, config.task_exemplar.as_str()),
        (&lexicon.star_action, config.action_exemplar.as_str()),
        (&lexicon.star_result, config.result_exemplar.as_str()),
    ];

    let mut resolutions = Vec::with_capacity(4);
    let mut semantic_failed = false;

    for (markers, exemplar) in slots {
        if let Some(resolution) = resolve_by_marker(sentences, markers) {
            resolutions.push(resolution);
            continue;
        }
        if semantic_failed {
            resolutions.push(SlotResolution::missing());
            continue;
        }
        match resolve_by_similarity(sentences, exemplar, config, similarity).await {
            Ok(resolution) => resolutions.push(resolution),
            Err(e) => {
                warn!("Semantic STAR resolution unavailable: {}", e);
                semantic_failed = true;
                resolutions.push(SlotResolution::missing());
            }
        }
    }

    // Order fixed above: situation, task, action, result
    let mut iter = resolutions.into_iter();
    let star = StarAnalysis {
        situation: iter.next().unwrap_or_else(SlotResolution::missing),
        task: iter.next().unwrap_or_else(SlotResolution::missing),
        action: iter.next().unwrap_or_else(SlotResolution::missing),
        result: iter.next().unwrap_or_else(SlotResolution::missing),
    };

    let (present, partial) = count_presences(&star);
    let value = present as f64 * config.present_points + partial as f64 * config.partial_points;

    let mut score = if semantic_failed {
        SubScore::degraded(value)
    } else {
        SubScore::computed(value)
    };
    score = score
        .with_measurement("slots_present", present as f64)
        .with_measurement("slots_partial", partial as f64);

    StructureOutcome { star, score }
}

/// Earliest sentence containing a marker phrase for the slot
fn resolve_by_marker(sentences: &[&str], markers: &Regex) -> Option<SlotResolution> {
    for (index, sentence) in sentences.iter().enumerate() {
        if let Some(hit) = markers.find(sentence) {
            return Some(SlotResolution {
                presence: SlotPresence::Present,
                sentence_index: Some(index),
                matched_phrase: Some(hit.as_str().to_lowercase()),
            });
        }
    }
    None
}

/// Earliest sentence clearing the similarity threshold against the exemplar
async fn resolve_by_similarity(
    sentences: &[&str],
    exemplar: &str,
    config: &StructureConfig,
    similarity: Option<&TimedSimilarity<'_>>,
) -> Result<SlotResolution, crate::error::CollaboratorError> {
    let Some(provider) = similarity else {
        return Ok(SlotResolution::missing());
    };
    for (index, sentence) in sentences.iter().enumerate() {
        let sim = provider.similarity(sentence, exemplar).await?;
        if sim >= config.similarity_threshold {
            return Ok(SlotResolution {
                presence: SlotPresence::Partial,
                sentence_index: Some(index),
                matched_phrase: None,
            });
        }
    }
    Ok(SlotResolution::missing())
}

fn count_presences(star: &StarAnalysis) -> (usize, usize) {
    let mut present = 0;
    let mut partial = 0;
    for (_, slot) in star.slots() {
        match slot.presence {
            SlotPresence::Present => present += 1,
            SlotPresence::Partial => partial += 1,
            SlotPresence::Missing => {}
        }
    }
    (present, partial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::lexical::split_sentences;
    use crate::collaborators::SimilarityProvider;
    use crate::config::MarkerLexicon;
    use crate::error::CollaboratorError;
    use async_trait::async_trait;
    use std::time::Duration;

    fn lexicon() -> CompiledLexicon {
        MarkerLexicon::default().compile().unwrap()
    }

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

    const FULL_STAR: &str = "The situation was that our deploys kept failing. \
        My task was to stabilize the release pipeline. \
        I implemented a staged rollout with automatic canary checks. \
        As a result we achieved zero failed deploys the next quarter.";

    #[tokio::test]
    async fn test_full_star_answer_scores_full_marks() {
        let sentences = split_sentences(FULL_STAR);
        let outcome =
            analyze_structure(&sentences, &lexicon(), &StructureConfig::default(), None).await;
        for (name, slot) in outcome.star.slots() {
            assert_eq!(slot.presence, SlotPresence::Present, "slot {} not present", name);
        }
        assert_eq!(outcome.score.value, 100.0);
        assert!(!outcome.score.degraded);
    }

    #[tokio::test]
    async fn test_unstructured_answer_scores_zero() {
        let sentences = split_sentences("Things happened. People talked. It ended eventually.");
        let outcome =
            analyze_structure(&sentences, &lexicon(), &StructureConfig::default(), None).await;
        assert_eq!(outcome.score.value, 0.0);
    }

    #[tokio::test]
    async fn test_earliest_sentence_wins() {
        let text = "There was a problem with billing. Later there was another problem.";
        let sentences = split_sentences(text);
        let outcome =
            analyze_structure(&sentences, &lexicon(), &StructureConfig::default(), None).await;
        assert_eq!(outcome.star.situation.sentence_index, Some(0));
    }

    #[tokio::test]
    async fn test_semantic_match_is_partial() {
        let provider = FixedSimilarity(0.8);
        let timed = TimedSimilarity::new(&provider, Duration::from_secs(5));
        let sentences = vec!["Our billing pipeline kept double charging customers"];
        let outcome = analyze_structure(
            &sentences,
            &lexicon(),
            &StructureConfig::default(),
            Some(&timed),
        )
        .await;
        assert_eq!(outcome.star.situation.presence, SlotPresence::Partial);
        assert_eq!(outcome.star.situation.sentence_index, Some(0));
        // 4 partial slots at 12 points each
        assert_eq!(outcome.score.value, 48.0);
    }

    #[tokio::test]
    async fn test_below_threshold_similarity_is_missing() {
        let provider = FixedSimilarity(0.3);
        let timed = TimedSimilarity::new(&provider, Duration::from_secs(5));
        let sentences = vec!["Our billing pipeline kept double charging customers"];
        let outcome = analyze_structure(
            &sentences,
            &lexicon(),
            &StructureConfig::default(),
            Some(&timed),
        )
        .await;
        assert_eq!(outcome.star.situation.presence, SlotPresence::Missing);
        assert!(!outcome.score.degraded);
    }

    #[tokio::test]
    async fn test_collaborator_failure_degrades_but_keeps_markers() {
        let provider = FailingSimilarity;
        let timed = TimedSimilarity::new(&provider, Duration::from_secs(5));
        let text = "The situation was a slow release train. Nothing else fits any slot here.";
        let sentences = split_sentences(text);
        let outcome = analyze_structure(
            &sentences,
            &lexicon(),
            &StructureConfig::default(),
            Some(&timed),
        )
        .await;
        assert_eq!(outcome.star.situation.presence, SlotPresence::Present);
        assert!(outcome.score.degraded);
        assert_eq!(outcome.score.value, 25.0);
    }
}
