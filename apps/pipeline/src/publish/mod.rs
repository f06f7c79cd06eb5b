//! Publisher: one S3 object, two DynamoDB rows.
//!
//! Writes run in a fixed order: HTML object, deployment record, analytics
//! record. Nothing is rolled back: if a record write fails, the HTML already
//! uploaded stays live with no matching history row.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::config::Environment;
use crate::errors::{PipelineError, StorageStep};
use crate::models::analysis::AnalysisRecord;
use crate::models::artifact::RenderedArtifact;
use crate::models::deployment::DeploymentRecord;

pub mod dynamodb;
pub mod s3;

pub use dynamodb::DynamoRecordStore;
pub use s3::S3ObjectStore;

const INDEX_DOCUMENT: &str = "index.html";

/// Bucket + key of the published document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    /// `<bucket>/<environment>/index.html`
    pub fn for_environment(bucket: &str, environment: Environment) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: format!("{environment}/{INDEX_DOCUMENT}"),
        }
    }

    /// Static-website endpoint for the object.
    pub fn website_url(&self, region: &str) -> String {
        format!(
            "http://{}.s3-website-{}.amazonaws.com/{}",
            self.bucket, region, self.key
        )
    }

    fn belongs_to(&self, environment: Environment) -> bool {
        self.key.starts_with(&format!("{environment}/"))
    }
}

impl std::fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Object storage for the rendered site. Overwrites any existing object.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_html(&self, location: &ObjectLocation, html: &str) -> Result<()>;
}

/// Key-value store for run history. Puts are unconditional (overwrite-by-key).
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put_deployment(&self, table: &str, record: &DeploymentRecord) -> Result<()>;
    async fn put_analysis(&self, table: &str, record: &AnalysisRecord) -> Result<()>;
}

pub struct Publisher<'a> {
    objects: &'a dyn ObjectStore,
    records: &'a dyn RecordStore,
    deployment_table: &'a str,
    analytics_table: &'a str,
}

impl<'a> Publisher<'a> {
    pub fn new(
        objects: &'a dyn ObjectStore,
        records: &'a dyn RecordStore,
        deployment_table: &'a str,
        analytics_table: &'a str,
    ) -> Self {
        Self {
            objects,
            records,
            deployment_table,
            analytics_table,
        }
    }

    pub async fn publish(
        &self,
        location: &ObjectLocation,
        artifact: &RenderedArtifact,
        deployment: &DeploymentRecord,
        analysis: &AnalysisRecord,
    ) -> Result<(), PipelineError> {
        if !location.belongs_to(artifact.environment) {
            return Err(PipelineError::Internal(anyhow::anyhow!(
                "refusing to write {} artifact to {location}",
                artifact.environment
            )));
        }

        self.objects
            .put_html(location, &artifact.html)
            .await
            .map_err(|e| PipelineError::storage(StorageStep::UploadHtml, format!("{e:#}")))?;
        info!("Uploaded {} bytes to s3://{location}", artifact.html.len());

        self.records
            .put_deployment(self.deployment_table, deployment)
            .await
            .map_err(|e| PipelineError::storage(StorageStep::PutDeployment, format!("{e:#}")))?;
        info!(
            "Recorded deployment {} in {}",
            deployment.deployment_id, self.deployment_table
        );

        self.records
            .put_analysis(self.analytics_table, analysis)
            .await
            .map_err(|e| PipelineError::storage(StorageStep::PutAnalytics, format!("{e:#}")))?;
        info!(
            "Recorded analysis {} in {}",
            analysis.analysis_id, self.analytics_table
        );

        Ok(())
    }
}
