//! podium-score CLI
//!
//! Scores one submission JSON file and prints the feedback record. The
//! configuration file (TOML) is resolved from `--config`, then the
//! `PODIUM_SCORE_CONFIG` environment variable, then built-in defaults.

use anyhow::{Context, Result};
use clap::Parser;
use podium_score::collaborators::{
    EmbeddingClient, GrammarProvider, LanguageToolClient, LexicalSimilarity, SimilarityProvider,
};
use podium_score::scoring::CoachingRequest;
use podium_score::{AnswerSubmission, ScoringConfig, ScoringPipeline};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "podium-score", version, about = "Score a spoken interview answer")]
struct Args {
    /// Submission JSON file (transcript, duration, optional audio summary)
    submission: PathBuf,

    /// Scoring configuration TOML file
    #[arg(long, env = "PODIUM_SCORE_CONFIG")]
    config: Option<PathBuf>,

    /// Also print the coaching request payload
    #[arg(long)]
    coaching: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("podium-score {}", env!("CARGO_PKG_VERSION"));

    let config = match ScoringConfig::resolve_path(args.config) {
        Some(path) => ScoringConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            info!("No config file given; using built-in defaults");
            ScoringConfig::default()
        }
    };

    let similarity: Option<Arc<dyn SimilarityProvider>> =
        match &config.collaborators.similarity_url {
            Some(url) => {
                info!("Similarity collaborator: {}", url);
                Some(Arc::new(EmbeddingClient::new(
                    url.clone(),
                    config.collaborators.timeout_seconds,
                )?))
            }
            None => {
                info!("No embedding service configured; using lexical similarity");
                Some(Arc::new(LexicalSimilarity))
            }
        };

    let grammar: Option<Arc<dyn GrammarProvider>> = match &config.collaborators.grammar_url {
        Some(url) => {
            info!("Grammar collaborator: {}", url);
            Some(Arc::new(LanguageToolClient::new(
                url.clone(),
                config.collaborators.timeout_seconds,
            )?))
        }
        None => {
            warn!("No grammar service configured; communication will score degraded");
            None
        }
    };

    let pipeline = ScoringPipeline::new(config, similarity, grammar)?;

    let submission_json = std::fs::read_to_string(&args.submission)
        .with_context(|| format!("Failed to read {}", args.submission.display()))?;
    let submission: AnswerSubmission =
        serde_json::from_str(&submission_json).context("Invalid submission JSON")?;

    // Ctrl-C aborts the submission without emitting a partial record
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    let record = pipeline.score(&submission, &cancel).await?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    if args.coaching {
        let request = CoachingRequest::from_record(&record);
        println!("{}", serde_json::to_string_pretty(&request)?);
    }

    Ok(())
}
