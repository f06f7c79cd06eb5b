//! Pipeline: orchestrates one publish run.
//!
//! Flow: load → render (Bedrock or Markdown) → analyze (Bedrock or heuristic)
//!       → upload HTML → deployment record → analytics record.
//!
//! Bedrock trouble never fails the run; only local and storage errors do.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::{analyze_with_fallback, Analyzer, ModelAnalyzer};
use crate::config::Environment;
use crate::errors::PipelineError;
use crate::llm_client::LlmError;
use crate::loader::ResumeSource;
use crate::models::analysis::AnalysisRecord;
use crate::models::artifact::RenderedArtifact;
use crate::models::deployment::{DeploymentRecord, STATUS_SUCCESS};
use crate::models::ModelUsed;
use crate::publish::{ObjectLocation, Publisher};
use crate::render::{render_with_fallback, ModelRenderer, Renderer};
use crate::state::AppState;

/// Printed to stdout as JSON at the end of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub status: &'static str,
    pub environment: Environment,
    pub commit_sha: String,
    pub run_id: Uuid,
    pub object_path: String,
    pub url: String,
    pub deployment_id: String,
    pub analysis_id: String,
    pub model_used: ModelUsed,
    pub analysis_model_used: ModelUsed,
    pub ats_score: u8,
    pub used_fallback: bool,
    /// `<step>:<reason>` for each step that fell back.
    pub fallback_reasons: Vec<String>,
    pub bedrock_region: String,
}

/// Runs the full pipeline once for `source`, stamping every record with `now`.
pub async fn run(
    state: &AppState,
    source: &ResumeSource,
    now: DateTime<Utc>,
) -> Result<RunSummary, PipelineError> {
    let config = &state.config;
    let markdown = source.markdown();
    let model = state.model.as_deref();

    // Step 1: Render
    let renderer = model.map(ModelRenderer::new);
    let rendered = render_with_fallback(
        renderer.as_ref().map(|r| r as &dyn Renderer<Error = LlmError>),
        markdown,
    )
    .await;

    // Step 2: Analyze
    let analyzer = model.map(ModelAnalyzer::new);
    let analysis = analyze_with_fallback(
        analyzer.as_ref().map(|a| a as &dyn Analyzer<Error = LlmError>),
        markdown,
    )
    .await;

    // Step 3: Assemble the artifact and both records
    let run_id = Uuid::new_v4();
    let location = ObjectLocation::for_environment(&config.bucket_name, config.environment);
    let url = location.website_url(&config.aws_region);

    let artifact = RenderedArtifact {
        html: rendered.html,
        environment: config.environment,
        commit_sha: config.commit_sha.clone(),
        model_used: rendered.model_used.clone(),
        rendered_at: now,
    };

    let deployment = DeploymentRecord {
        deployment_id: DeploymentRecord::deployment_id_for(&config.commit_sha, config.environment),
        run_id,
        commit_sha: config.commit_sha.clone(),
        environment: config.environment,
        status: STATUS_SUCCESS.to_string(),
        url: url.clone(),
        model_used: rendered.model_used.clone(),
        deployed_at: now,
    };

    let analysis_record = AnalysisRecord {
        analysis_id: AnalysisRecord::analysis_id_for(&config.commit_sha, now),
        commit_sha: config.commit_sha.clone(),
        environment: config.environment,
        model_used: analysis.model_used.clone(),
        analyzed_at: now,
        analytics: analysis.analytics,
    };

    // Step 4: Publish
    let publisher = Publisher::new(
        state.objects.as_ref(),
        state.records.as_ref(),
        &config.deployment_table,
        &config.analytics_table,
    );
    publisher
        .publish(&location, &artifact, &deployment, &analysis_record)
        .await?;

    let fallback_reasons: Vec<String> = [
        ("render", rendered.fallback_reason),
        ("analysis", analysis.fallback_reason),
    ]
    .into_iter()
    .filter_map(|(step, reason)| reason.map(|r| format!("{step}:{r}")))
    .collect();

    info!(
        "Published {} for commit {} ({})",
        config.environment,
        config.commit_sha,
        if fallback_reasons.is_empty() {
            "model".to_string()
        } else {
            format!("fallback: {}", fallback_reasons.join(", "))
        }
    );

    Ok(RunSummary {
        status: "ok",
        environment: config.environment,
        commit_sha: config.commit_sha.clone(),
        run_id,
        object_path: location.to_string(),
        url,
        deployment_id: deployment.deployment_id,
        analysis_id: analysis_record.analysis_id,
        used_fallback: artifact.model_used.is_fallback() || analysis_record.model_used.is_fallback(),
        model_used: artifact.model_used,
        analysis_model_used: analysis_record.model_used,
        ats_score: analysis_record.analytics.ats_score,
        fallback_reasons,
        bedrock_region: config.bedrock_region.clone(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
