//! Core types for the scoring engine
//!
//! The submission is immutable once constructed; the sub-score set is owned by
//! the pipeline during computation and becomes part of the write-once
//! `FeedbackRecord` when finalized. Every sub-score carries the raw
//! measurements that produced it so a score is always explainable after the
//! fact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One spoken answer to be scored
///
/// Immutable input. `reference_answer` may be empty (content scoring falls
/// back to keyword coverage); `audio` and `keywords` are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSubmission {
    /// Submission identity for record correlation
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Transcribed answer text (from the transcription collaborator)
    pub transcript: String,
    /// Recording duration in seconds (must be positive)
    pub duration_seconds: f64,
    /// Reference "ideal answer" text; may be empty
    #[serde(default)]
    pub reference_answer: String,
    /// Summary statistics from the audio pipeline, when available
    #[serde(default)]
    pub audio: Option<AudioSummary>,
    /// Domain-relevant terms the answer should cover
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Summary statistics derived from the audio signal
///
/// Aggregated features only; the engine never touches raw audio.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AudioSummary {
    /// Mean fundamental frequency in Hz
    pub pitch_mean_hz: f64,
    /// Pitch standard deviation in Hz (expressiveness vs monotone)
    pub pitch_std_hz: f64,
    /// Pitch range in Hz
    #[serde(default)]
    pub pitch_range_hz: f64,
    /// Mean RMS energy in dB
    pub energy_mean_db: f64,
    /// Energy standard deviation in dB
    #[serde(default)]
    pub energy_std_db: f64,
    /// Pauses per minute, when the audio pipeline measured them
    #[serde(default)]
    pub pauses_per_minute: Option<f64>,
}

/// A single 0-100 dimension score with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubScore {
    /// Score value, always within [0, 100]
    pub value: f64,
    /// True when the primary data source was unavailable and the documented
    /// fallback produced this value
    pub degraded: bool,
    /// Raw measurements behind the value, keyed by measurement name
    pub measurements: Vec<Measurement>,
}

impl SubScore {
    /// Construct a non-degraded sub-score, clamping into [0, 100]
    pub fn computed(value: f64) -> Self {
        Self {
            value: clamp_score(value),
            degraded: false,
            measurements: Vec::new(),
        }
    }

    /// Construct a degraded (fallback) sub-score, clamping into [0, 100]
    pub fn degraded(value: f64) -> Self {
        Self {
            value: clamp_score(value),
            degraded: true,
            measurements: Vec::new(),
        }
    }

    /// Attach a raw measurement for explainability
    pub fn with_measurement(mut self, name: &str, value: f64) -> Self {
        self.measurements.push(Measurement {
            name: name.to_string(),
            value,
        });
        self
    }
}

/// Named raw measurement attached to a sub-score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    pub value: f64,
}

/// The six dimension scores produced for one submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubScoreSet {
    pub content: SubScore,
    pub delivery: SubScore,
    pub communication: SubScore,
    pub voice: SubScore,
    pub confidence: SubScore,
    pub structure: SubScore,
}

impl SubScoreSet {
    /// True when every sub-score was produced by a fallback
    pub fn all_degraded(&self) -> bool {
        self.content.degraded
            && self.delivery.degraded
            && self.communication.degraded
            && self.voice.degraded
            && self.confidence.degraded
            && self.structure.degraded
    }
}

/// Resolution of one STAR slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotPresence {
    /// Marker phrase found
    Present,
    /// No marker, but a sentence cleared the semantic similarity threshold
    Partial,
    /// Neither signal found
    Missing,
}

/// One resolved STAR slot with the evidence that resolved it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotResolution {
    pub presence: SlotPresence,
    /// Zero-based index of the earliest sentence that satisfied the slot
    pub sentence_index: Option<usize>,
    /// Marker phrase that matched, for Present resolutions
    pub matched_phrase: Option<String>,
}

impl SlotResolution {
    pub fn missing() -> Self {
        Self {
            presence: SlotPresence::Missing,
            sentence_index: None,
            matched_phrase: None,
        }
    }
}

/// STAR structure analysis for one answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarAnalysis {
    pub situation: SlotResolution,
    pub task: SlotResolution,
    pub action: SlotResolution,
    pub result: SlotResolution,
}

impl StarAnalysis {
    pub fn all_missing() -> Self {
        Self {
            situation: SlotResolution::missing(),
            task: SlotResolution::missing(),
            action: SlotResolution::missing(),
            result: SlotResolution::missing(),
        }
    }

    pub fn slots(&self) -> [(&'static str, &SlotResolution); 4] {
        [
            ("situation", &self.situation),
            ("task", &self.task),
            ("action", &self.action),
            ("result", &self.result),
        ]
    }
}

/// A detected filler word/phrase with its occurrence count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillerCount {
    pub phrase: String,
    pub count: u32,
}

/// Keyword coverage detail
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordCoverage {
    pub found: Vec<String>,
    pub missing: Vec<String>,
}

/// The write-once scoring output for one submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Submission this record was computed for
    pub submission_id: Uuid,
    /// Weighted final score, rounded to one decimal, within [0, 100]
    pub final_score: f64,
    /// The six dimension scores with their measurements
    pub scores: SubScoreSet,
    /// STAR slot resolutions
    pub star: StarAnalysis,
    /// Detected filler phrases with counts
    pub fillers: Vec<FillerCount>,
    /// Keyword coverage, when a keyword list was supplied
    pub keywords: KeywordCoverage,
    /// Human-readable observations collected from the analyzers
    pub notes: Vec<String>,
    /// Quality gate findings; empty when no gate tripped
    #[serde(default)]
    pub quality_issues: Vec<String>,
    /// Version of the marker lexicon the scores were computed against
    pub lexicon_version: String,
    /// Computation timestamp
    pub scored_at: DateTime<Utc>,
}

/// Clamp a score into [0, 100]
pub fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Round to one decimal place (record contract: one-decimal final score)
pub fn round_score(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
