//! Scoring pipeline orchestration
//!
//! `ScoringPipeline` owns the validated configuration, the compiled marker
//! lexicon, and the injected collaborators. Per submission it validates the
//! input, fans the collaborator-backed analyzers out concurrently, runs the
//! text-local analyzers inline, and joins everything in the aggregator.
//!
//! Collaborator failures degrade individual sub-scores and are logged at
//! warn; they never fail the submission. Cancellation aborts the whole
//! submission with an error and never emits a partial record.

use crate::analyzers::{
    communication, confidence, content, delivery, lexical, quality, structure, voice,
};
use crate::collaborators::{
    with_timeout, GrammarCheck, GrammarProvider, SimilarityProvider, TimedSimilarity,
};
use crate::config::{CompiledLexicon, ScoringConfig};
use crate::error::{Result, ScoreError};
use crate::scoring::aggregator;
use crate::types::{clamp_score, round_score, AnswerSubmission, FeedbackRecord, SubScoreSet};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The scoring engine
pub struct ScoringPipeline {
    config: ScoringConfig,
    lexicon: CompiledLexicon,
    similarity: Option<Arc<dyn SimilarityProvider>>,
    grammar: Option<Arc<dyn GrammarProvider>>,
}

impl ScoringPipeline {
    /// Build a pipeline from validated configuration and injected collaborators
    pub fn new(
        config: ScoringConfig,
        similarity: Option<Arc<dyn SimilarityProvider>>,
        grammar: Option<Arc<dyn GrammarProvider>>,
    ) -> Result<Self> {
        config.validate()?;
        let lexicon = config.lexicon.compile()?;
        Ok(Self {
            config,
            lexicon,
            similarity,
            grammar,
        })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one submission
    ///
    /// Returns a complete `FeedbackRecord` (possibly carrying degraded
    /// sub-scores) or an error; never a partial record.
    pub async fn score(
        &self,
        submission: &AnswerSubmission,
        cancel: &CancellationToken,
    ) -> Result<FeedbackRecord> {
        if cancel.is_cancelled() {
            return Err(ScoreError::Cancelled);
        }
        tokio::select! {
            _ = cancel.cancelled() => {
                info!(submission_id = %submission.id, "Submission cancelled");
                Err(ScoreError::Cancelled)
            }
            record = self.score_inner(submission) => record,
        }
    }

    async fn score_inner(&self, submission: &AnswerSubmission) -> Result<FeedbackRecord> {
        validate(submission)?;

        info!(
            submission_id = %submission.id,
            duration_seconds = submission.duration_seconds,
            has_audio = submission.audio.is_some(),
            "Scoring submission"
        );

        let transcript = submission.transcript.as_str();
        let timeout = Duration::from_secs(self.config.collaborators.timeout_seconds);

        // Text-local analyzers run inline; they are pure and fast
        let features = lexical::extract(transcript, submission.duration_seconds, &self.lexicon);
        let delivery_outcome = delivery::score_delivery(&features, &self.config.delivery);
        let voice_outcome = voice::score_voice(submission.audio.as_ref(), &self.config.voice);
        let confidence_score = confidence::score_confidence(
            transcript,
            voice_outcome.voice_confidence,
            &self.lexicon,
            &self.config.confidence,
        );

        // Collaborator-backed analyzers fan out concurrently
        let timed_similarity = self
            .similarity
            .as_deref()
            .map(|p| TimedSimilarity::new(p, timeout));
        let sentences = lexical::split_sentences(transcript);

        let (content_outcome, structure_outcome, grammar_check) = tokio::join!(
            content::score_content(
                transcript,
                &submission.reference_answer,
                &submission.keywords,
                timed_similarity.as_ref(),
                &self.config.content,
            ),
            structure::analyze_structure(
                &sentences,
                &self.lexicon,
                &self.config.structure,
                timed_similarity.as_ref(),
            ),
            self.check_grammar(transcript, timeout),
        );

        let communication_outcome = communication::score_communication(
            transcript,
            grammar_check.as_ref(),
            &self.lexicon,
            &self.config.communication,
        );

        let scores = SubScoreSet {
            content: content_outcome.score,
            delivery: delivery_outcome.score,
            communication: communication_outcome.score,
            voice: voice_outcome.score,
            confidence: confidence_score,
            structure: structure_outcome.score,
        };

        if scores.all_degraded() {
            warn!(submission_id = %submission.id, "Every sub-score degraded; rejecting submission");
            return Err(ScoreError::AllSubScoresDegraded);
        }

        // Quality gates adjust the unrounded weighted sum: penalties subtract,
        // caps bound, and only then does the final clamp-and-round happen
        let quality = quality::apply_quality_gates(
            transcript,
            &features,
            content_outcome.similarity,
            scores.structure.value,
            &self.config.quality,
        );
        let mut weighted = aggregator::weighted_sum(&scores, &self.config.weights);
        if quality.total_penalty > 0.0 || quality.score_cap.is_some() {
            warn!(
                submission_id = %submission.id,
                penalty = quality.total_penalty,
                cap = ?quality.score_cap,
                issues = ?quality.issues,
                "Quality gates tripped"
            );
            weighted -= quality.total_penalty;
            if let Some(cap) = quality.score_cap {
                weighted = weighted.min(cap);
            }
        }
        let final_score = round_score(clamp_score(weighted));

        let mut notes = Vec::new();
        notes.push(format!(
            "Pacing: {} ({:.0} WPM)",
            delivery_outcome.assessment, features.wpm
        ));
        if let Some(note) = communication_outcome.note {
            notes.push(note);
        }
        if grammar_check.is_none() && self.grammar.is_some() {
            notes.push(
                "Grammar check unavailable; communication scored from vocabulary and sentence structure"
                    .to_string(),
            );
        }
        if scores.content.degraded {
            if content_outcome.similarity.is_some() {
                notes.push("Content scored with word-overlap similarity".to_string());
            } else {
                notes.push("Content scored from keyword coverage only".to_string());
            }
        }

        info!(
            submission_id = %submission.id,
            final_score,
            "Submission scored"
        );

        Ok(FeedbackRecord {
            submission_id: submission.id,
            final_score,
            scores,
            star: structure_outcome.star,
            fillers: features.fillers,
            keywords: content_outcome.coverage,
            notes,
            quality_issues: quality.issues,
            lexicon_version: self.lexicon.version.clone(),
            scored_at: Utc::now(),
        })
    }

    async fn check_grammar(&self, transcript: &str, timeout: Duration) -> Option<GrammarCheck> {
        let provider = self.grammar.as_deref()?;
        match with_timeout(timeout, provider.check(transcript)).await {
            Ok(check) => {
                debug!(provider = provider.name(), errors = check.error_count, "Grammar check done");
                Some(check)
            }
            Err(e) => {
                warn!(provider = provider.name(), "Grammar collaborator failed: {}", e);
                None
            }
        }
    }
}

/// Submission validation; fatal per submission
fn validate(submission: &AnswerSubmission) -> Result<()> {
    if !submission.duration_seconds.is_finite() || submission.duration_seconds <= 0.0 {
        return Err(ScoreError::InvalidDuration(submission.duration_seconds));
    }
    if submission.transcript.trim().is_empty() {
        return Err(ScoreError::EmptyTranscript);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn submission(transcript: &str, duration: f64) -> AnswerSubmission {
        AnswerSubmission {
            id: Uuid::new_v4(),
            transcript: transcript.to_string(),
            duration_seconds: duration,
            reference_answer: String::new(),
            audio: None,
            keywords: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_zero_duration_rejected() {
        let pipeline = ScoringPipeline::new(ScoringConfig::default(), None, None).unwrap();
        let result = pipeline
            .score(&submission("some answer", 0.0), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ScoreError::InvalidDuration(_))));
    }

    #[tokio::test]
    async fn test_negative_and_nan_duration_rejected() {
        let pipeline = ScoringPipeline::new(ScoringConfig::default(), None, None).unwrap();
        for duration in [-5.0, f64::NAN, f64::INFINITY] {
            let result = pipeline
                .score(&submission("some answer", duration), &CancellationToken::new())
                .await;
            assert!(matches!(result, Err(ScoreError::InvalidDuration(_))));
        }
    }

    #[tokio::test]
    async fn test_whitespace_transcript_rejected() {
        let pipeline = ScoringPipeline::new(ScoringConfig::default(), None, None).unwrap();
        let result = pipeline
            .score(&submission("   \n\t ", 30.0), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ScoreError::EmptyTranscript)));
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_rejected() {
        let pipeline = ScoringPipeline::new(ScoringConfig::default(), None, None).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = pipeline.score(&submission("a fine answer", 30.0), &cancel).await;
        assert!(matches!(result, Err(ScoreError::Cancelled)));
    }

    #[tokio::test]
    async fn test_invalid_weights_rejected_at_construction() {
        let mut config = ScoringConfig::default();
        config.weights.content = 0.9;
        assert!(ScoringPipeline::new(config, None, None).is_err());
    }
}
