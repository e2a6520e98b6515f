//! End-to-end pipeline tests with fake collaborators

use async_trait::async_trait;
use podium_score::collaborators::{
    GrammarCheck, GrammarProvider, SimilarityProvider,
};
use podium_score::{
    AnswerSubmission, AudioSummary, CollaboratorError, ScoreError, ScoringConfig, ScoringPipeline,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

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

struct SlowSimilarity;

#[async_trait]
impl SimilarityProvider for SlowSimilarity {
    async fn similarity(&self, _: &str, _: &str) -> Result<f64, CollaboratorError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(0.5)
    }
    fn name(&self) -> &'static str {
        "slow"
    }
}

struct CleanGrammar;

#[async_trait]
impl GrammarProvider for CleanGrammar {
    async fn check(&self, _: &str) -> Result<GrammarCheck, CollaboratorError> {
        Ok(GrammarCheck::default())
    }
    fn name(&self) -> &'static str {
        "clean"
    }
}

struct FailingGrammar;

#[async_trait]
impl GrammarProvider for FailingGrammar {
    async fn check(&self, _: &str) -> Result<GrammarCheck, CollaboratorError> {
        Err(CollaboratorError::Network("connection refused".to_string()))
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

fn pipeline(
    similarity: Option<Arc<dyn SimilarityProvider>>,
    grammar: Option<Arc<dyn GrammarProvider>>,
) -> ScoringPipeline {
    ScoringPipeline::new(ScoringConfig::default(), similarity, grammar).unwrap()
}

/// A well-structured answer: STAR slots covered, varied vocabulary, no fillers
const STRONG_ANSWER: &str = "The situation was that our checkout service kept \
timing out during peak traffic windows. My task was to restore reliable \
response times before the holiday season. I implemented connection pooling, \
added covering indexes, and introduced a caching layer for hot product \
lookups. As a result we achieved a forty percent latency reduction and zero \
timeout incidents the following quarter.";

fn strong_submission() -> AnswerSubmission {
    let words = STRONG_ANSWER.split_whitespace().count() as f64;
    AnswerSubmission {
        id: Uuid::new_v4(),
        transcript: STRONG_ANSWER.to_string(),
        // Duration chosen so WPM lands at 145, inside the optimal band
        duration_seconds: words / 145.0 * 60.0,
        reference_answer: "Describe diagnosing and fixing a production performance problem"
            .to_string(),
        audio: None,
        keywords: vec!["caching".to_string(), "latency".to_string()],
    }
}

#[tokio::test]
async fn test_strong_answer_scores_high_eighties() {
    let engine = pipeline(Some(Arc::new(FixedSimilarity(0.85))), Some(Arc::new(CleanGrammar)));
    let record = engine
        .score(&strong_submission(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(
        (80.0..=92.0).contains(&record.final_score),
        "Expected a high-80s final score, got {}",
        record.final_score
    );
    assert_eq!(record.scores.delivery.value, 100.0);
    assert_eq!(record.scores.structure.value, 100.0);
    assert!(!record.scores.content.degraded);
    assert!(!record.scores.communication.degraded);
    assert!(record.fillers.is_empty());
    assert_eq!(record.keywords.missing, Vec::<String>::new());
}

#[tokio::test]
async fn test_scoring_is_deterministic() {
    let engine = pipeline(Some(Arc::new(FixedSimilarity(0.85))), Some(Arc::new(CleanGrammar)));
    let submission = strong_submission();
    let cancel = CancellationToken::new();

    let first = engine.score(&submission, &cancel).await.unwrap();
    for _ in 0..5 {
        let again = engine.score(&submission, &cancel).await.unwrap();
        assert_eq!(again.final_score, first.final_score);
        assert_eq!(again.scores.content.value, first.scores.content.value);
        assert_eq!(again.scores.delivery.value, first.scores.delivery.value);
        assert_eq!(
            again.scores.communication.value,
            first.scores.communication.value
        );
        assert_eq!(again.scores.voice.value, first.scores.voice.value);
        assert_eq!(again.scores.confidence.value, first.scores.confidence.value);
        assert_eq!(again.scores.structure.value, first.scores.structure.value);
    }
}

#[tokio::test]
async fn test_fast_filler_heavy_answer_scores_below_clean() {
    let engine = pipeline(Some(Arc::new(FixedSimilarity(0.85))), Some(Arc::new(CleanGrammar)));
    let cancel = CancellationToken::new();

    let clean = strong_submission();
    let clean_record = engine.score(&clean, &cancel).await.unwrap();

    // Same answer with fillers sprinkled in, rushed to roughly 185 WPM
    let rushed_transcript = STRONG_ANSWER.replace(". ", ". Um, um, ");
    let words = rushed_transcript.split_whitespace().count() as f64;
    let rushed = AnswerSubmission {
        id: Uuid::new_v4(),
        transcript: rushed_transcript,
        duration_seconds: words / 185.0 * 60.0,
        reference_answer: clean.reference_answer.clone(),
        audio: None,
        keywords: clean.keywords.clone(),
    };
    let rushed_record = engine.score(&rushed, &cancel).await.unwrap();

    assert!(rushed_record.scores.delivery.value < clean_record.scores.delivery.value);
    assert!(rushed_record.final_score < clean_record.final_score);
    assert!(rushed_record.fillers.iter().any(|f| f.phrase == "um" && f.count >= 2));
}

#[tokio::test]
async fn test_grammar_outage_degrades_communication_only() {
    let engine = pipeline(Some(Arc::new(FixedSimilarity(0.85))), Some(Arc::new(FailingGrammar)));
    let record = engine
        .score(&strong_submission(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(record.scores.communication.degraded);
    assert!(record.scores.communication.value > 0.0);
    assert!(!record.scores.content.degraded);
    assert!(!record.scores.delivery.degraded);
    assert!(record
        .notes
        .iter()
        .any(|n| n.contains("Grammar check unavailable")));
}

#[tokio::test]
async fn test_no_collaborators_still_produces_record() {
    let engine = pipeline(None, None);
    let record = engine
        .score(&strong_submission(), &CancellationToken::new())
        .await
        .unwrap();

    // Content falls back to keyword coverage; text-local dimensions are intact
    assert!(record.scores.content.degraded);
    assert!(!record.scores.delivery.degraded);
    assert_eq!(record.scores.structure.value, 100.0);
    assert!((0.0..=100.0).contains(&record.final_score));
}

#[tokio::test]
async fn test_audio_summary_feeds_voice_and_confidence() {
    let engine = pipeline(Some(Arc::new(FixedSimilarity(0.85))), Some(Arc::new(CleanGrammar)));
    let cancel = CancellationToken::new();

    let text_only = strong_submission();
    let text_record = engine.score(&text_only, &cancel).await.unwrap();
    assert_eq!(text_record.scores.voice.value, 60.0);
    assert!(!text_record.scores.voice.degraded);

    let mut with_audio = strong_submission();
    with_audio.audio = Some(AudioSummary {
        pitch_mean_hz: 180.0,
        pitch_std_hz: 35.0,
        pitch_range_hz: 140.0,
        energy_mean_db: -18.0,
        energy_std_db: 3.0,
        pauses_per_minute: Some(4.0),
    });
    let audio_record = engine.score(&with_audio, &cancel).await.unwrap();
    assert!(audio_record.scores.voice.value > 85.0);
    assert_ne!(
        audio_record.scores.confidence.value,
        text_record.scores.confidence.value,
        "Voice channel should move the confidence blend"
    );
}

#[tokio::test]
async fn test_similarity_timeout_degrades_content_only() {
    let mut config = ScoringConfig::default();
    config.collaborators.timeout_seconds = 1;
    let engine = ScoringPipeline::new(
        config,
        Some(Arc::new(SlowSimilarity)),
        Some(Arc::new(CleanGrammar)),
    )
    .unwrap();

    let record = engine
        .score(&strong_submission(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(record.scores.content.degraded);
    assert!(!record.scores.delivery.degraded);
    assert!(!record.scores.communication.degraded);
    // Marker phrases resolve every STAR slot without the similarity channel
    assert_eq!(record.scores.structure.value, 100.0);
    assert!(record
        .notes
        .iter()
        .any(|n| n.contains("keyword coverage only")));
}

#[tokio::test]
async fn test_six_word_answer_capped_despite_good_pacing() {
    let engine = pipeline(Some(Arc::new(FixedSimilarity(0.85))), Some(Arc::new(CleanGrammar)));
    let transcript = "The situation was that I delivered";
    let words = transcript.split_whitespace().count() as f64;
    let submission = AnswerSubmission {
        id: Uuid::new_v4(),
        transcript: transcript.to_string(),
        // Same optimal-band pacing as the strong answer
        duration_seconds: words / 145.0 * 60.0,
        reference_answer: "Describe a project you delivered".to_string(),
        audio: None,
        keywords: Vec::new(),
    };
    let record = engine.score(&submission, &CancellationToken::new()).await.unwrap();

    assert!(
        record.final_score <= 40.0,
        "Six words should be capped hard, got {}",
        record.final_score
    );
    assert!(record
        .quality_issues
        .iter()
        .any(|i| i.contains("too short")));
}

#[tokio::test]
async fn test_repeated_word_answer_penalized() {
    let engine = pipeline(Some(Arc::new(FixedSimilarity(0.85))), Some(Arc::new(CleanGrammar)));
    let transcript = "The project was a project about the project and the project team \
        ran the project with project goals and project outcomes for the project";
    let words = transcript.split_whitespace().count() as f64;
    let submission = AnswerSubmission {
        id: Uuid::new_v4(),
        transcript: transcript.to_string(),
        duration_seconds: words / 145.0 * 60.0,
        reference_answer: "Describe a project you delivered".to_string(),
        audio: None,
        keywords: Vec::new(),
    };
    let record = engine.score(&submission, &CancellationToken::new()).await.unwrap();

    assert!(record
        .quality_issues
        .iter()
        .any(|i| i.contains("repeating the same phrases")));
    assert!(
        record.final_score < 60.0,
        "Repetition and missing structure should drag the score down, got {}",
        record.final_score
    );
}

#[tokio::test]
async fn test_cancellation_yields_no_partial_record() {
    let engine = pipeline(Some(Arc::new(SlowSimilarity)), Some(Arc::new(CleanGrammar)));
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let result = engine.score(&strong_submission(), &cancel).await;
    assert!(matches!(result, Err(ScoreError::Cancelled)));
}

#[tokio::test]
async fn test_empty_transcript_is_a_hard_error() {
    let engine = pipeline(None, None);
    let mut submission = strong_submission();
    submission.transcript = String::new();
    let result = engine.score(&submission, &CancellationToken::new()).await;
    assert!(matches!(result, Err(ScoreError::EmptyTranscript)));
}

#[tokio::test]
async fn test_record_serializes_round_trip() {
    let engine = pipeline(Some(Arc::new(FixedSimilarity(0.85))), Some(Arc::new(CleanGrammar)));
    let record = engine
        .score(&strong_submission(), &CancellationToken::new())
        .await
        .unwrap();

    let json = serde_json::to_string(&record).unwrap();
    let parsed: podium_score::FeedbackRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.final_score, record.final_score);
    assert_eq!(parsed.lexicon_version, record.lexicon_version);
}

#[tokio::test]
async fn test_lexicon_version_stamped_on_record() {
    let engine = pipeline(None, None);
    let record = engine
        .score(&strong_submission(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(record.lexicon_version, engine.config().lexicon.version);
}
