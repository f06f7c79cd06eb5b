mod analysis;
mod config;
mod errors;
mod llm_client;
mod loader;
mod models;
mod pipeline;
mod publish;
mod render;
mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{BedrockClient, TextModel};
use crate::loader::ResumeSource;
use crate::publish::{DynamoRecordStore, S3ObjectStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; a missing variable exits before any AWS call
    let config = Config::from_env()?;

    // Initialize structured logging (stderr; stdout carries the run summary)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting resume pipeline v{} (env={}, commit={})",
        env!("CARGO_PKG_VERSION"),
        config.environment,
        config.commit_sha
    );

    let source = ResumeSource::from_path(&config.resume_path)
        .with_context(|| format!("Failed to read resume at {}", config.resume_path.display()))?;

    let state = build_state(config).await;

    let summary = pipeline::run(&state, &source, Utc::now())
        .await
        .inspect_err(|e| error!("Pipeline failed [{}]: {e}", e.code()))?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Builds the AWS clients. S3 and DynamoDB use `AWS_REGION`; Bedrock may
/// live in a different region.
async fn build_state(config: Config) -> AppState {
    let aws = load_sdk_config(&config.aws_region).await;
    let objects = Arc::new(S3ObjectStore::new(aws_sdk_s3::Client::new(&aws)));
    let records = Arc::new(DynamoRecordStore::new(aws_sdk_dynamodb::Client::new(&aws)));
    info!("S3 and DynamoDB clients initialized ({})", config.aws_region);

    let model: Option<Arc<dyn TextModel>> = if config.disable_model {
        info!("DISABLE_MODEL set; Bedrock will not be called");
        None
    } else {
        let bedrock = load_sdk_config(&config.bedrock_region).await;
        let client = BedrockClient::new(
            aws_sdk_bedrockruntime::Client::new(&bedrock),
            config.model_id.clone(),
        );
        info!(
            "Bedrock client initialized (model: {}, region: {})",
            config.model_id, config.bedrock_region
        );
        Some(Arc::new(client))
    };

    AppState {
        config,
        model,
        objects,
        records,
    }
}

async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}
