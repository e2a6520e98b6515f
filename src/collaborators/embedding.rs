//! Embedding service client and lexical fallback
//!
//! The embedding collaborator turns two texts into vectors; similarity is the
//! cosine of those vectors mapped from [-1, 1] into [0, 1]. When the service
//! is not configured or unreachable, `LexicalSimilarity` provides a
//! deterministic word-overlap (Jaccard) measure so content and structure
//! scoring can still run; it reports `semantic() == false` so the content
//! sub-score carries the degraded flag.

use crate::collaborators::SimilarityProvider;
use crate::error::CollaboratorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

const USER_AGENT: &str = "podium-score/0.1.0";

/// Request body for the embedding endpoint
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: [&'a str; 2],
}

/// Response body from the embedding endpoint
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f64>>,
}

/// HTTP client for the embedding/similarity collaborator
pub struct EmbeddingClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl EmbeddingClient {
    /// Create a new embedding client
    pub fn new(base_url: String, timeout_seconds: u64) -> Result<Self, CollaboratorError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn embed_pair(&self, a: &str, b: &str) -> Result<(Vec<f64>, Vec<f64>), CollaboratorError> {
        let url = format!("{}/embed", self.base_url);

        tracing::debug!(url = %url, "Querying embedding service");

        let response = self
            .http_client
            .post(&url)
            .json(&EmbedRequest { texts: [a, b] })
            .send()
            .await
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Api(status.as_u16(), error_text));
        }

        let mut body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Parse(e.to_string()))?;

        if body.embeddings.len() != 2 {
            return Err(CollaboratorError::Parse(format!(
                "Expected 2 embeddings, got {}",
                body.embeddings.len()
            )));
        }
        let second = body.embeddings.pop().unwrap_or_default();
        let first = body.embeddings.pop().unwrap_or_default();
        Ok((first, second))
    }
}

#[async_trait]
impl SimilarityProvider for EmbeddingClient {
    async fn similarity(&self, text: &str, reference: &str) -> Result<f64, CollaboratorError> {
        let (a, b) = self.embed_pair(text, reference).await?;
        let cosine = cosine_similarity(&a, &b).ok_or_else(|| {
            CollaboratorError::Parse("Embedding vectors empty or mismatched".to_string())
        })?;
        // Map cosine from [-1, 1] into [0, 1]
        Ok(((cosine + 1.0) / 2.0).clamp(0.0, 1.0))
    }

    fn name(&self) -> &'static str {
        "embedding"
    }
}

/// Cosine similarity of two vectors; None on mismatch or zero norm
fn cosine_similarity(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a * norm_b))
}

/// Deterministic word-overlap similarity (Jaccard on lowercase word sets)
///
/// Used directly when no embedding service is configured, and as the scoring
/// fallback when the service fails mid-flight.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalSimilarity;

impl LexicalSimilarity {
    pub fn jaccard(text: &str, reference: &str) -> f64 {
        let words_a: HashSet<String> = word_set(text);
        let words_b: HashSet<String> = word_set(reference);
        if words_a.is_empty() || words_b.is_empty() {
            return 0.0;
        }
        let intersection = words_a.intersection(&words_b).count() as f64;
        let union = words_a.union(&words_b).count() as f64;
        intersection / union
    }
}

fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

#[async_trait]
impl SimilarityProvider for LexicalSimilarity {
    async fn similarity(&self, text: &str, reference: &str) -> Result<f64, CollaboratorError> {
        Ok(Self::jaccard(text, reference))
    }

    fn name(&self) -> &'static str {
        "lexical"
    }

    fn semantic(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_vectors() {
        let v = vec![0.5, -0.2, 0.8];
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(sim.abs() < 1e-12);
    }

    #[test]
    fn test_cosine_rejects_mismatch_and_zero() {
        assert!(cosine_similarity(&[1.0], &[1.0, 2.0]).is_none());
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).is_none());
        assert!(cosine_similarity(&[], &[]).is_none());
    }

    #[test]
    fn test_jaccard_overlap() {
        let sim = LexicalSimilarity::jaccard("the quick brown fox", "the slow brown dog");
        // intersection {the, brown} = 2, union = 6
        assert!((sim - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_jaccard_ignores_case_and_punctuation() {
        let sim = LexicalSimilarity::jaccard("Teamwork, communication.", "teamwork communication");
        assert!((sim - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_jaccard_empty_text_is_zero() {
        assert_eq!(LexicalSimilarity::jaccard("", "reference text"), 0.0);
    }

    #[tokio::test]
    async fn test_lexical_provider_is_deterministic() {
        let provider = LexicalSimilarity;
        let a = provider.similarity("led a team project", "led the project").await.unwrap();
        let b = provider.similarity("led a team project", "led the project").await.unwrap();
        assert_eq!(a, b);
    }
}
