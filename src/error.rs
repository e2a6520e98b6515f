//! Error types for the scoring engine
//!
//! Three-way taxonomy: invalid input is fatal for the submission and surfaced
//! immediately; collaborator failures are recovered locally into degraded
//! sub-scores and never abort a submission on their own; configuration errors
//! are fatal at load time, never at request time.

use thiserror::Error;

/// Result type for scoring operations
pub type Result<T> = std::result::Result<T, ScoreError>;

/// Submission-level scoring errors
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Non-positive or non-finite recording duration
    #[error("Invalid duration: {0} seconds (must be positive and finite)")]
    InvalidDuration(f64),

    /// Empty or whitespace-only transcript
    #[error("Empty transcript: submission contains no scoreable content")]
    EmptyTranscript,

    /// Submission cancelled before completion; no partial record is emitted
    #[error("Submission cancelled")]
    Cancelled,

    /// Every sub-score simultaneously degraded; a fully-degraded record is not useful
    #[error("All sub-scores degraded: no usable signal in submission")]
    AllSubScoresDegraded,

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (config/submission file read)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from an external collaborator call
///
/// These never propagate as submission failures; the owning sub-score records
/// its documented fallback and sets the degraded flag instead.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Collaborator returned an error response
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse collaborator response
    #[error("Parse error: {0}")]
    Parse(String),

    /// Call exceeded the configured timeout
    #[error("Timed out after {0} seconds")]
    Timeout(u64),

    /// Collaborator not configured for this deployment
    #[error("Collaborator not available: {0}")]
    NotAvailable(String),
}
