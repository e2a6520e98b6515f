//! External collaborator interfaces
//!
//! The engine consumes two network collaborators: an embedding service for
//! semantic similarity and a grammar-check service. Both sit behind traits so
//! the pipeline is constructed with injected providers and tests substitute
//! deterministic fakes. A collaborator failure never fails a submission; the
//! owning sub-score falls back and sets its degraded flag.

pub mod embedding;
pub mod grammar;

pub use embedding::{EmbeddingClient, LexicalSimilarity};
pub use grammar::LanguageToolClient;

use crate::error::CollaboratorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Semantic similarity between two texts
#[async_trait]
pub trait SimilarityProvider: Send + Sync {
    /// Similarity of `text` to `reference`, normalized into [0, 1]
    async fn similarity(
        &self,
        text: &str,
        reference: &str,
    ) -> Result<f64, CollaboratorError>;

    /// Short provider name for logging
    fn name(&self) -> &'static str;

    /// True for providers backed by a real embedding model; word-overlap
    /// stand-ins return false so dependent sub-scores carry the degraded flag
    fn semantic(&self) -> bool {
        true
    }
}

/// Grammar checking for transcript text
#[async_trait]
pub trait GrammarProvider: Send + Sync {
    async fn check(&self, text: &str) -> Result<GrammarCheck, CollaboratorError>;

    /// Short provider name for logging
    fn name(&self) -> &'static str;
}

/// Result of a grammar check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrammarCheck {
    /// Number of grammar/spelling issues counted toward the penalty
    pub error_count: u32,
    /// Individual issues, for feedback notes
    pub issues: Vec<GrammarIssue>,
}

/// One grammar issue reported by the checker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarIssue {
    pub message: String,
    pub issue_type: String,
    pub offset: usize,
    pub length: usize,
}

/// Bound a collaborator call by the configured timeout
///
/// Expiry becomes `CollaboratorError::Timeout`, which the caller recovers into
/// the owning sub-score's fallback like any other collaborator failure.
pub async fn with_timeout<T>(
    timeout: Duration,
    fut: impl Future<Output = Result<T, CollaboratorError>>,
) -> Result<T, CollaboratorError> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::Timeout(timeout.as_secs())),
    }
}

/// A similarity provider bounded by the configured per-call timeout
pub struct TimedSimilarity<'a> {
    provider: &'a dyn SimilarityProvider,
    timeout: Duration,
}

impl<'a> TimedSimilarity<'a> {
    pub fn new(provider: &'a dyn SimilarityProvider, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub async fn similarity(
        &self,
        text: &str,
        reference: &str,
    ) -> Result<f64, CollaboratorError> {
        with_timeout(self.timeout, self.provider.similarity(text, reference)).await
    }

    pub fn name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn semantic(&self) -> bool {
        self.provider.semantic()
    }
}
