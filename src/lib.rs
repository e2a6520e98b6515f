//! podium-score: deterministic multi-signal scoring for spoken interview answers
//!
//! Fuses transcript text, timing, and optional audio statistics into six
//! 0-100 sub-scores (content, delivery, communication, voice, confidence,
//! structure), then combines them through validated weights into a final
//! score with per-dimension provenance. External collaborators (embedding
//! similarity, grammar checking) are consulted with timeouts; when one is
//! unavailable the affected sub-score falls back and is flagged degraded
//! rather than failing the submission.
//!
//! Identical input and configuration always produce identical scores.

pub mod analyzers;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod scoring;
pub mod types;

pub use crate::config::{MarkerLexicon, ScoreWeights, ScoringConfig};
pub use crate::error::{CollaboratorError, Result, ScoreError};
pub use crate::scoring::{aggregate, CoachingRequest, ScoringPipeline};
pub use crate::types::{
    AnswerSubmission, AudioSummary, FeedbackRecord, SlotPresence, StarAnalysis, SubScore,
    SubScoreSet,
};
