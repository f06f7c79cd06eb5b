use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Environment;
use crate::models::ModelUsed;

/// The HTML document produced by one run, plus where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedArtifact {
    pub html: String,
    pub environment: Environment,
    pub commit_sha: String,
    pub model_used: ModelUsed,
    pub rendered_at: DateTime<Utc>,
}
