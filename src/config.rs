//! Configuration for the scoring engine
//!
//! Everything product-tunable lives here: the six score weights, the optimal
//! WPM band and penalty rates, grammar/TTR thresholds, STAR slot thresholds
//! and exemplars, collaborator endpoints, and the marker lexicon.
//!
//! Configuration is loaded once at startup (CLI path, then environment
//! variable, then built-in defaults), validated immediately, and treated as
//! read-only for the life of the process. A weight set that does not sum to
//! 1.0 within epsilon is rejected outright rather than renormalized, so
//! scoring behavior stays auditable.

use crate::error::{Result, ScoreError};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Tolerance for weight-sum validation
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Environment variable consulted when no CLI config path is given
pub const CONFIG_ENV_VAR: &str = "PODIUM_SCORE_CONFIG";

/// Top-level scoring configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,
    pub delivery: DeliveryConfig,
    pub communication: CommunicationConfig,
    pub structure: StructureConfig,
    pub confidence: ConfidenceConfig,
    pub voice: VoiceConfig,
    pub content: ContentConfig,
    pub quality: QualityGateConfig,
    pub collaborators: CollaboratorConfig,
    pub lexicon: MarkerLexicon,
}

impl ScoringConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ScoringConfig = toml::from_str(&content)
            .map_err(|e| ScoreError::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        info!("Scoring configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Resolve the config file path: CLI argument, then environment variable
    ///
    /// Returns `None` when neither is set; callers fall back to built-in
    /// defaults in that case.
    pub fn resolve_path(cli_arg: Option<PathBuf>) -> Option<PathBuf> {
        if let Some(path) = cli_arg {
            return Some(path);
        }
        std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from)
    }

    /// Validate the whole configuration; fatal at startup, never at request time
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.delivery.validate()?;
        self.communication.validate()?;
        self.structure.validate()?;
        self.confidence.validate()?;
        self.voice.validate()?;
        self.content.validate()?;
        self.quality.validate()?;
        self.collaborators.validate()?;
        self.lexicon.validate()?;
        Ok(())
    }
}

fn sums_to_one(weights: &[f64]) -> bool {
    (weights.iter().sum::<f64>() - 1.0).abs() <= WEIGHT_EPSILON
}

/// The six sub-score weights; must sum to 1.0 within epsilon
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub content: f64,
    pub delivery: f64,
    pub communication: f64,
    pub voice: f64,
    pub confidence: f64,
    pub structure: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            content: 0.30,
            delivery: 0.15,
            communication: 0.15,
            voice: 0.15,
            confidence: 0.15,
            structure: 0.10,
        }
    }
}

impl ScoreWeights {
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.content,
            self.delivery,
            self.communication,
            self.voice,
            self.confidence,
            self.structure,
        ]
    }

    pub fn validate(&self) -> Result<()> {
        let weights = self.as_array();
        if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(ScoreError::Config(
                "Score weights must be non-negative and finite".to_string(),
            ));
        }
        if !sums_to_one(&weights) {
            return Err(ScoreError::Config(format!(
                "Score weights must sum to 1.0 (got {:.6}); renormalization is not performed",
                weights.iter().sum::<f64>()
            )));
        }
        Ok(())
    }
}

/// Delivery sub-score tuning (WPM band and filler penalties)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Lower edge of the optimal WPM band
    pub wpm_min: f64,
    /// Upper edge of the optimal WPM band
    pub wpm_max: f64,
    /// Penalty points per WPM below the band, capped by `max_pace_penalty`
    pub slow_penalty_per_wpm: f64,
    /// Penalty points per WPM above the band, capped by `max_pace_penalty`
    pub fast_penalty_per_wpm: f64,
    /// Cap for the pace penalty
    pub max_pace_penalty: f64,
    /// Penalty points per detected filler word
    pub filler_penalty: f64,
    /// Cap for the total filler penalty
    pub max_filler_penalty: f64,
    /// Below this WPM the assessment text reads "too slow"
    pub wpm_too_slow: f64,
    /// Above this WPM the assessment text reads "too fast"
    pub wpm_too_fast: f64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            wpm_min: 130.0,
            wpm_max: 160.0,
            slow_penalty_per_wpm: 0.5,
            fast_penalty_per_wpm: 0.3,
            max_pace_penalty: 30.0,
            filler_penalty: 2.0,
            max_filler_penalty: 30.0,
            wpm_too_slow: 100.0,
            wpm_too_fast: 180.0,
        }
    }
}

impl DeliveryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.wpm_min <= 0.0 || self.wpm_max <= self.wpm_min {
            return Err(ScoreError::Config(format!(
                "Invalid WPM band: [{}, {}]",
                self.wpm_min, self.wpm_max
            )));
        }
        let penalties = [
            self.slow_penalty_per_wpm,
            self.fast_penalty_per_wpm,
            self.max_pace_penalty,
            self.filler_penalty,
            self.max_filler_penalty,
        ];
        if penalties.iter().any(|p| *p < 0.0 || !p.is_finite()) {
            return Err(ScoreError::Config(
                "Delivery penalties must be non-negative and finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Communication sub-score tuning (grammar, vocabulary diversity, sentences)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunicationConfig {
    pub grammar_penalty_per_error: f64,
    pub max_grammar_penalty: f64,
    /// Blend weight for the grammar component
    pub grammar_weight: f64,
    /// Blend weight for type-token-ratio vocabulary diversity
    pub diversity_weight: f64,
    /// Blend weight for the sentence-length heuristic
    pub sentence_weight: f64,
    /// Blend weight for coherence (transition-word flow)
    pub coherence_weight: f64,
    /// Blend weight for professional vocabulary usage
    pub professional_weight: f64,
    /// TTR at or above this is excellent diversity
    pub ttr_excellent: f64,
    /// TTR at or above this is good diversity
    pub ttr_good: f64,
    /// TTR below this is poor diversity
    pub ttr_poor: f64,
    /// Minimum word count for a meaningful diversity measurement
    pub min_words_for_diversity: usize,
    /// Minimum word count for coherence and professional-vocabulary analysis
    pub min_words_for_analysis: usize,
    /// Average sentence length below this is penalized steeply
    pub sentence_len_min: f64,
    /// Average sentence length above this is penalized steeply
    pub sentence_len_max: f64,
    /// Optimal average sentence length band
    pub sentence_len_optimal_min: f64,
    pub sentence_len_optimal_max: f64,
}

impl Default for CommunicationConfig {
    fn default() -> Self {
        Self {
            grammar_penalty_per_error: 3.0,
            max_grammar_penalty: 40.0,
            grammar_weight: 0.30,
            diversity_weight: 0.25,
            sentence_weight: 0.15,
            coherence_weight: 0.15,
            professional_weight: 0.15,
            ttr_excellent: 0.65,
            ttr_good: 0.50,
            ttr_poor: 0.30,
            min_words_for_diversity: 10,
            min_words_for_analysis: 20,
            sentence_len_min: 8.0,
            sentence_len_max: 30.0,
            sentence_len_optimal_min: 12.0,
            sentence_len_optimal_max: 20.0,
        }
    }
}

impl CommunicationConfig {
    pub fn validate(&self) -> Result<()> {
        let weights = [
            self.grammar_weight,
            self.diversity_weight,
            self.sentence_weight,
            self.coherence_weight,
            self.professional_weight,
        ];
        if !sums_to_one(&weights) {
            return Err(ScoreError::Config(
                "Communication blend weights must sum to 1.0".to_string(),
            ));
        }
        if !(self.ttr_poor < self.ttr_good && self.ttr_good < self.ttr_excellent) {
            return Err(ScoreError::Config(
                "TTR thresholds must be ordered: poor < good < excellent".to_string(),
            ));
        }
        if self.grammar_penalty_per_error < 0.0 || self.max_grammar_penalty < 0.0 {
            return Err(ScoreError::Config(
                "Grammar penalties must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// STAR structure detector tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    /// Points per slot resolved by a marker phrase
    pub present_points: f64,
    /// Points per slot resolved only by semantic similarity
    pub partial_points: f64,
    /// Minimum sentence-to-exemplar similarity for a Partial resolution
    pub similarity_threshold: f64,
    /// Canonical exemplar sentence per slot, compared against each sentence
    pub situation_exemplar: String,
    pub task_exemplar: String,
    pub action_exemplar: String,
    pub result_exemplar: String,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            present_points: 25.0,
            partial_points: 12.0,
            similarity_threshold: 0.55,
            situation_exemplar:
                "In my previous role our team faced a challenging situation.".to_string(),
            task_exemplar: "My task was to take responsibility for reaching the goal.".to_string(),
            action_exemplar: "I took action and implemented the steps I decided on.".to_string(),
            result_exemplar: "As a result we achieved a measurable improvement.".to_string(),
        }
    }
}

impl StructureConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(ScoreError::Config(format!(
                "STAR similarity threshold out of range (0, 1]: {}",
                self.similarity_threshold
            )));
        }
        if self.partial_points > self.present_points || self.partial_points < 0.0 {
            return Err(ScoreError::Config(
                "STAR points must satisfy 0 <= partial <= present".to_string(),
            ));
        }
        Ok(())
    }
}

/// Confidence sub-score tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Neutral starting point before marker adjustments
    pub baseline: f64,
    /// Bonus points per assertive marker
    pub assertive_bonus: f64,
    /// Penalty points per hedging marker
    pub hedging_penalty: f64,
    /// Blend weight for the text-derived signal when audio is present
    pub text_weight: f64,
    /// Blend weight for the voice-derived signal when audio is present
    pub voice_weight: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            baseline: 70.0,
            assertive_bonus: 3.0,
            hedging_penalty: 4.0,
            text_weight: 0.6,
            voice_weight: 0.4,
        }
    }
}

impl ConfidenceConfig {
    pub fn validate(&self) -> Result<()> {
        if !sums_to_one(&[self.text_weight, self.voice_weight]) {
            return Err(ScoreError::Config(
                "Confidence text/voice blend weights must sum to 1.0".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.baseline) {
            return Err(ScoreError::Config(format!(
                "Confidence baseline out of range [0, 100]: {}",
                self.baseline
            )));
        }
        Ok(())
    }
}

/// Voice sub-score tuning (pitch/energy variance mapping)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Score assigned when no audio metrics are available
    pub neutral_score: f64,
    /// Blend weight for the pitch-variation component
    pub pitch_weight: f64,
    /// Blend weight for the energy-projection component
    pub energy_weight: f64,
    /// Pitch std below this reads as monotone
    pub pitch_std_monotone: f64,
    /// Optimal pitch std band (expressive but not erratic)
    pub pitch_std_optimal_min: f64,
    pub pitch_std_optimal_max: f64,
    /// Pitch std above this reads as overly dramatic
    pub pitch_std_dramatic: f64,
    /// Mean energy at or below this scores 0
    pub energy_db_floor: f64,
    /// Mean energy at or above this scores 100
    pub energy_db_full: f64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            neutral_score: 60.0,
            pitch_weight: 0.6,
            energy_weight: 0.4,
            pitch_std_monotone: 15.0,
            pitch_std_optimal_min: 25.0,
            pitch_std_optimal_max: 50.0,
            pitch_std_dramatic: 70.0,
            energy_db_floor: -40.0,
            energy_db_full: -15.0,
        }
    }
}

impl VoiceConfig {
    pub fn validate(&self) -> Result<()> {
        if !sums_to_one(&[self.pitch_weight, self.energy_weight]) {
            return Err(ScoreError::Config(
                "Voice pitch/energy blend weights must sum to 1.0".to_string(),
            ));
        }
        let ordered = self.pitch_std_monotone < self.pitch_std_optimal_min
            && self.pitch_std_optimal_min < self.pitch_std_optimal_max
            && self.pitch_std_optimal_max < self.pitch_std_dramatic;
        if !ordered {
            return Err(ScoreError::Config(
                "Pitch std breakpoints must be ordered: monotone < optimal_min < optimal_max < dramatic"
                    .to_string(),
            ));
        }
        if self.energy_db_floor >= self.energy_db_full {
            return Err(ScoreError::Config(
                "Energy floor must be below energy full-score level".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.neutral_score) {
            return Err(ScoreError::Config(format!(
                "Voice neutral score out of range [0, 100]: {}",
                self.neutral_score
            )));
        }
        Ok(())
    }
}

/// Content sub-score tuning (similarity/keyword blend)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub similarity_weight: f64,
    pub keyword_weight: f64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            similarity_weight: 0.7,
            keyword_weight: 0.3,
        }
    }
}

impl ContentConfig {
    pub fn validate(&self) -> Result<()> {
        if !sums_to_one(&[self.similarity_weight, self.keyword_weight]) {
            return Err(ScoreError::Config(
                "Content similarity/keyword blend weights must sum to 1.0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Quality gates applied to the weighted final score
///
/// Each gate is a deterministic text heuristic that subtracts a penalty when
/// tripped; the worst gates additionally cap the final score so a trivially
/// short or nonsensical answer cannot coast to a good result on in-band
/// pacing and a lucky marker hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityGateConfig {
    /// Below this word count the short-answer penalty applies
    pub min_word_count: usize,
    pub short_answer_penalty: f64,
    /// Below this word count the final score is capped at `cap_very_short`
    pub very_short_word_count: usize,
    /// Minimum distinct words (longer than two characters)
    pub min_unique_words: usize,
    pub low_vocabulary_penalty: f64,
    /// Filler occurrences divided by word count
    pub max_filler_ratio: f64,
    pub filler_ratio_penalty: f64,
    /// Minimum similarity to the reference answer, in [0, 1]
    pub min_relevance: f64,
    pub off_topic_penalty: f64,
    /// Most-frequent-word share of the distinct vocabulary (words over three
    /// characters)
    pub max_repetition: f64,
    pub repetition_penalty: f64,
    pub nonsense_penalty: f64,
    /// Structure sub-score below this caps the final score at `cap_no_structure`
    pub min_structure_score: f64,
    pub cap_very_short: f64,
    pub cap_short: f64,
    pub cap_off_topic: f64,
    pub cap_nonsense: f64,
    pub cap_no_structure: f64,
}

impl Default for QualityGateConfig {
    fn default() -> Self {
        Self {
            min_word_count: 15,
            short_answer_penalty: 50.0,
            very_short_word_count: 10,
            min_unique_words: 10,
            low_vocabulary_penalty: 30.0,
            max_filler_ratio: 0.15,
            filler_ratio_penalty: 25.0,
            min_relevance: 0.25,
            off_topic_penalty: 40.0,
            max_repetition: 0.3,
            repetition_penalty: 20.0,
            nonsense_penalty: 50.0,
            min_structure_score: 30.0,
            cap_very_short: 40.0,
            cap_short: 60.0,
            cap_off_topic: 35.0,
            cap_nonsense: 15.0,
            cap_no_structure: 55.0,
        }
    }
}

impl QualityGateConfig {
    pub fn validate(&self) -> Result<()> {
        let penalties = [
            self.short_answer_penalty,
            self.low_vocabulary_penalty,
            self.filler_ratio_penalty,
            self.off_topic_penalty,
            self.repetition_penalty,
            self.nonsense_penalty,
        ];
        if penalties.iter().any(|p| *p < 0.0 || !p.is_finite()) {
            return Err(ScoreError::Config(
                "Quality gate penalties must be non-negative and finite".to_string(),
            ));
        }
        let ratios = [self.max_filler_ratio, self.min_relevance, self.max_repetition];
        if ratios.iter().any(|r| !(0.0..=1.0).contains(r)) {
            return Err(ScoreError::Config(
                "Quality gate ratios must lie in [0, 1]".to_string(),
            ));
        }
        let caps = [
            self.cap_very_short,
            self.cap_short,
            self.cap_off_topic,
            self.cap_nonsense,
            self.cap_no_structure,
        ];
        if caps.iter().any(|c| !(0.0..=100.0).contains(c)) {
            return Err(ScoreError::Config(
                "Quality gate score caps must lie in [0, 100]".to_string(),
            ));
        }
        if self.very_short_word_count > self.min_word_count {
            return Err(ScoreError::Config(
                "very_short_word_count must not exceed min_word_count".to_string(),
            ));
        }
        Ok(())
    }
}

/// External collaborator endpoints and timeouts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaboratorConfig {
    /// Embedding/similarity service base URL; None disables semantic scoring
    pub similarity_url: Option<String>,
    /// Grammar-check service base URL (LanguageTool-compatible); None disables
    pub grammar_url: Option<String>,
    /// Per-call timeout in seconds; on expiry the owning sub-score degrades
    pub timeout_seconds: u64,
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            similarity_url: None,
            grammar_url: None,
            timeout_seconds: 10,
        }
    }
}

impl CollaboratorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(ScoreError::Config(
                "Collaborator timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

/// Product-tunable marker dictionaries
///
/// These are configuration data, not algorithmic constants. The `version`
/// string is stamped onto every FeedbackRecord so score reproducibility can be
/// audited across dictionary changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerLexicon {
    pub version: String,
    /// Filler words/phrases, counted case-insensitively as whole words
    pub fillers: Vec<String>,
    /// Hedging markers that lower the confidence score
    pub hedging: Vec<String>,
    /// Assertive markers that raise the confidence score
    pub assertive: Vec<String>,
    /// Transition words/phrases indicating organized flow
    pub transitions: Vec<String>,
    /// Professional vocabulary (action verbs and business terms), matched by
    /// six-character stem so "implemented" also covers "implementing"
    pub professional: Vec<String>,
    pub star_situation: Vec<String>,
    pub star_task: Vec<String>,
    pub star_action: Vec<String>,
    pub star_result: Vec<String>,
}

impl Default for MarkerLexicon {
    fn default() -> Self {
        let to_vec = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            version: "2025.1".to_string(),
            fillers: to_vec(&[
                "um", "uh", "umm", "uhh", "er", "err", "like", "you know", "basically",
                "actually", "literally", "honestly", "i mean", "kind of", "sort of",
            ]),
            hedging: to_vec(&[
                "i think", "maybe", "sort of", "kind of", "probably", "i guess", "perhaps",
                "possibly", "not sure", "i feel like",
            ]),
            assertive: to_vec(&[
                "i led", "i achieved", "definitely", "i decided", "i implemented",
                "i delivered", "i created", "i built", "i managed", "certainly", "i drove",
            ]),
            transitions: to_vec(&[
                "first", "second", "third", "finally", "next", "then", "lastly",
                "additionally", "moreover", "furthermore", "also", "besides", "in addition",
                "however", "although", "nevertheless", "on the other hand", "conversely", "but",
                "therefore", "consequently", "as a result", "because", "thus", "hence",
                "for example", "for instance", "specifically", "such as", "namely",
                "in conclusion", "to summarize", "overall", "in summary", "ultimately",
            ]),
            professional: to_vec(&[
                "implemented", "developed", "managed", "coordinated", "analyzed",
                "designed", "optimized", "established", "facilitated", "achieved",
                "collaborated", "executed", "strategized", "delegated", "evaluated",
                "led", "created", "resolved", "improved", "streamlined",
                "initiated", "delivered", "mentored", "negotiated", "presented",
                "stakeholder", "deliverable", "milestone", "objective", "deadline",
                "benchmark", "metrics", "strategy", "framework", "methodology",
                "scalable", "efficient", "innovative", "proactive", "comprehensive",
            ]),
            star_situation: to_vec(&[
                "situation", "context", "background", "there was", "faced with",
                "challenge was", "problem was", "at the time", "in my role",
            ]),
            star_task: to_vec(&[
                "task", "responsible for", "my role", "needed to", "had to", "goal was",
                "objective was", "assigned to", "in charge of",
            ]),
            star_action: to_vec(&[
                "i did", "i took", "implemented", "developed", "created", "initiated",
                "led", "organized", "coordinated", "decided to",
            ]),
            star_result: to_vec(&[
                "result", "outcome", "achieved", "increased", "decreased", "improved",
                "saved", "reduced", "generated", "led to", "resulted in", "percent",
            ]),
        }
    }
}

impl MarkerLexicon {
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(ScoreError::Config(
                "Marker lexicon version must be non-empty".to_string(),
            ));
        }
        let tables = [
            ("fillers", &self.fillers),
            ("hedging", &self.hedging),
            ("assertive", &self.assertive),
            ("transitions", &self.transitions),
            ("professional", &self.professional),
            ("star_situation", &self.star_situation),
            ("star_task", &self.star_task),
            ("star_action", &self.star_action),
            ("star_result", &self.star_result),
        ];
        for (name, table) in tables {
            if table.is_empty() || table.iter().any(|p| p.trim().is_empty()) {
                return Err(ScoreError::Config(format!(
                    "Marker table '{}' must be non-empty with non-blank entries",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Compile the lexicon into matchers; done once at pipeline construction
    pub fn compile(&self) -> Result<CompiledLexicon> {
        Ok(CompiledLexicon {
            version: self.version.clone(),
            fillers: phrase_matcher(&self.fillers)?,
            hedging: phrase_matcher(&self.hedging)?,
            assertive: phrase_matcher(&self.assertive)?,
            transitions: phrase_matcher(&self.transitions)?,
            professional: stem_matcher(&self.professional, PROFESSIONAL_STEM_LEN)?,
            star_situation: phrase_matcher(&self.star_situation)?,
            star_task: phrase_matcher(&self.star_task)?,
            star_action: phrase_matcher(&self.star_action)?,
            star_result: phrase_matcher(&self.star_result)?,
        })
    }
}

/// Stem length used for professional-vocabulary matching
const PROFESSIONAL_STEM_LEN: usize = 6;

/// Build a single case-insensitive whole-word alternation for a phrase table
///
/// Phrases are sorted longest-first so an occurrence of "sort of" is matched
/// as the phrase, never double-counted as any shorter overlapping entry.
fn phrase_matcher(phrases: &[String]) -> Result<Regex> {
    let mut sorted: Vec<&String> = phrases.iter().collect();
    sorted.sort_by_key(|p| std::cmp::Reverse(p.len()));
    let pattern = format!(
        r"\b(?:{})\b",
        sorted
            .iter()
            .map(|p| regex::escape(p.trim()))
            .collect::<Vec<_>>()
            .join("|")
    );
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ScoreError::Config(format!("Invalid marker pattern: {}", e)))
}

/// Build a stem alternation: each term contributes its first `stem_len`
/// characters followed by any letters, so inflected forms still match
fn stem_matcher(terms: &[String], stem_len: usize) -> Result<Regex> {
    let mut stems: Vec<String> = terms
        .iter()
        .map(|t| {
            let trimmed = t.trim();
            let cut = trimmed
                .char_indices()
                .nth(stem_len)
                .map(|(i, _)| i)
                .unwrap_or(trimmed.len());
            regex::escape(&trimmed[..cut])
        })
        .collect();
    stems.sort_by_key(|s| std::cmp::Reverse(s.len()));
    let pattern = format!(r"\b(?:{})[a-z]*\b", stems.join("|"));
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ScoreError::Config(format!("Invalid marker pattern: {}", e)))
}

/// Marker lexicon compiled into reusable matchers
#[derive(Debug, Clone)]
pub struct CompiledLexicon {
    pub version: String,
    pub fillers: Regex,
    pub hedging: Regex,
    pub assertive: Regex,
    pub transitions: Regex,
    pub professional: Regex,
    pub star_situation: Regex,
    pub star_task: Regex,
    pub star_action: Regex,
    pub star_result: Regex,
}
