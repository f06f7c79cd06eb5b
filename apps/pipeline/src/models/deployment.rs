use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::Environment;
use crate::models::ModelUsed;

pub const STATUS_SUCCESS: &str = "success";

/// One row in the deployment history table.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentRecord {
    /// `<commit>#<environment>`; a re-run of the same commit overwrites its row.
    pub deployment_id: String,
    /// Unique per process; correlates the record with the run's logs.
    pub run_id: Uuid,
    pub commit_sha: String,
    pub environment: Environment,
    pub status: String,
    pub url: String,
    pub model_used: ModelUsed,
    pub deployed_at: DateTime<Utc>,
}

impl DeploymentRecord {
    pub fn deployment_id_for(commit_sha: &str, environment: Environment) -> String {
        format!("{commit_sha}#{environment}")
    }
}
