//! Analyzer: ATS score and sub-metrics, via Bedrock when possible.
//!
//! Mirrors the renderer: `ModelAnalyzer` (primary) and `HeuristicAnalyzer`
//! (deterministic fallback) behind one `Analyzer` trait, chosen by
//! `analyze_with_fallback`.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::llm_client::LlmError;
use crate::models::analysis::AtsAnalytics;
use crate::models::ModelUsed;

pub mod heuristic;
pub mod model;
pub mod prompts;

pub use heuristic::HeuristicAnalyzer;
pub use model::ModelAnalyzer;

#[derive(Debug, Clone)]
pub struct Analysis {
    pub analytics: AtsAnalytics,
    pub model_used: ModelUsed,
}

/// An ATS scoring backend. The heuristic backend uses `Infallible`.
#[async_trait]
pub trait Analyzer: Send + Sync {
    type Error: std::error::Error + Send;

    async fn analyze(&self, markdown: &str) -> Result<Analysis, Self::Error>;
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub analytics: AtsAnalytics,
    pub model_used: ModelUsed,
    pub fallback_reason: Option<String>,
}

/// Tries `primary` once; any error is logged and the heuristic takes over.
pub async fn analyze_with_fallback(
    primary: Option<&dyn Analyzer<Error = LlmError>>,
    markdown: &str,
) -> AnalysisOutcome {
    let Some(primary) = primary else {
        info!("Analyzing with heuristic scorer (model disabled)");
        return fallback(markdown, "disabled").await;
    };

    match primary.analyze(markdown).await {
        Ok(analysis) => {
            info!(
                "ATS score {}/100 from {}",
                analysis.analytics.ats_score, analysis.model_used
            );
            AnalysisOutcome {
                analytics: analysis.analytics,
                model_used: analysis.model_used,
                fallback_reason: None,
            }
        }
        Err(e) if e.is_throttling() => {
            warn!("Bedrock throttled the analysis call ({e}); falling back to heuristic scoring");
            fallback(markdown, e.kind()).await
        }
        Err(e) => {
            warn!(
                "Bedrock analysis failed ({}: {e}); falling back to heuristic scoring",
                e.kind()
            );
            fallback(markdown, e.kind()).await
        }
    }
}

async fn fallback(markdown: &str, reason: &str) -> AnalysisOutcome {
    let analysis = match HeuristicAnalyzer.analyze(markdown).await {
        Ok(analysis) => analysis,
        Err(never) => match never {},
    };
    info!("Heuristic ATS score {}/100", analysis.analytics.ats_score);
    AnalysisOutcome {
        analytics: analysis.analytics,
        model_used: analysis.model_used,
        fallback_reason: Some(reason.to_string()),
    }
}
