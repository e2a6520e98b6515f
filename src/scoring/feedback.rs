//! Coaching request packaging
//!
//! The downstream coaching collaborator turns a scored record into narrative
//! feedback. That service is outside this engine; here we only package the
//! record into the payload it consumes: final and per-dimension scores, the
//! weakest dimensions first, STAR gaps, and the analyzer notes.

use crate::types::{FeedbackRecord, SlotPresence};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload for the downstream coaching collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingRequest {
    pub submission_id: Uuid,
    pub final_score: f64,
    /// (dimension, score) pairs, weakest first
    pub dimensions: Vec<(String, f64)>,
    /// STAR slots the answer did not fully cover
    pub star_gaps: Vec<String>,
    /// Filler phrases worth calling out, highest count first
    pub frequent_fillers: Vec<String>,
    pub notes: Vec<String>,
}

impl CoachingRequest {
    /// Package a scored record for coaching
    pub fn from_record(record: &FeedbackRecord) -> Self {
        let mut dimensions = vec![
            ("content".to_string(), record.scores.content.value),
            ("delivery".to_string(), record.scores.delivery.value),
            ("communication".to_string(), record.scores.communication.value),
            ("voice".to_string(), record.scores.voice.value),
            ("confidence".to_string(), record.scores.confidence.value),
            ("structure".to_string(), record.scores.structure.value),
        ];
        dimensions.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let star_gaps = record
            .star
            .slots()
            .iter()
            .filter(|(_, slot)| slot.presence != SlotPresence::Present)
            .map(|(name, _)| name.to_string())
            .collect();

        let frequent_fillers = record
            .fillers
            .iter()
            .filter(|f| f.count >= 2)
            .map(|f| f.phrase.clone())
            .collect();

        let notes = record
            .notes
            .iter()
            .chain(record.quality_issues.iter())
            .cloned()
            .collect();

        Self {
            submission_id: record.submission_id,
            final_score: record.final_score,
            dimensions,
            star_gaps,
            frequent_fillers,
            notes,
        }
    }
}
