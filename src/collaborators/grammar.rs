//! Grammar-check collaborator client
//!
//! Talks to a LanguageTool-compatible server (`POST /v2/check`). Only matches
//! whose rule issue type is grammatical or a misspelling count toward the
//! communication penalty; style and punctuation suggestions are ignored
//! because spoken transcripts are not punctuated prose.

use crate::collaborators::{GrammarCheck, GrammarIssue, GrammarProvider};
use crate::error::CollaboratorError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = "podium-score/0.1.0";
const CHECK_LANGUAGE: &str = "en-US";

/// Issue types counted toward the grammar penalty
const COUNTED_ISSUE_TYPES: &[&str] = &["grammar", "misspelling", "typographical"];

#[derive(Debug, Deserialize)]
struct CheckResponse {
    matches: Vec<CheckMatch>,
}

#[derive(Debug, Deserialize)]
struct CheckMatch {
    message: String,
    offset: usize,
    length: usize,
    rule: CheckRule,
}

#[derive(Debug, Deserialize)]
struct CheckRule {
    #[serde(rename = "issueType", default)]
    issue_type: String,
}

/// HTTP client for a LanguageTool-compatible grammar service
pub struct LanguageToolClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl LanguageToolClient {
    /// Create a new grammar-check client
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
}

#[async_trait]
impl GrammarProvider for LanguageToolClient {
    async fn check(&self, text: &str) -> Result<GrammarCheck, CollaboratorError> {
        let url = format!("{}/v2/check", self.base_url);

        tracing::debug!(url = %url, chars = text.len(), "Querying grammar service");

        let response = self
            .http_client
            .post(&url)
            .form(&[("text", text), ("language", CHECK_LANGUAGE)])
            .send()
            .await
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Api(status.as_u16(), error_text));
        }

        let body: CheckResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Parse(e.to_string()))?;

        let issues: Vec<GrammarIssue> = body
            .matches
            .into_iter()
            .filter(|m| COUNTED_ISSUE_TYPES.contains(&m.rule.issue_type.as_str()))
            .map(|m| GrammarIssue {
                message: m.message,
                issue_type: m.rule.issue_type,
                offset: m.offset,
                length: m.length,
            })
            .collect();

        tracing::debug!(counted = issues.len(), "Grammar check complete");

        Ok(GrammarCheck {
            error_count: issues.len() as u32,
            issues,
        })
    }

    fn name(&self) -> &'static str {
        "languagetool"
    }
}
