use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Environment;
use crate::models::ModelUsed;

pub const MAX_LIST_ITEMS: usize = 50;
pub const MAX_READABILITY_CHARS: usize = 40;

/// ATS score plus its sub-metrics. Same shape from both analyzer backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtsAnalytics {
    pub word_count: u32,
    /// 0 – 100
    pub ats_score: u8,
    pub keywords: Vec<String>,
    pub readability: String,
    pub missing_sections: Vec<String>,
}

/// One row in the analytics table.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub analysis_id: String,
    pub commit_sha: String,
    pub environment: Environment,
    pub model_used: ModelUsed,
    pub analyzed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub analytics: AtsAnalytics,
}

impl AnalysisRecord {
    /// `<commit>-<UTC timestamp to the millisecond>`.
    pub fn analysis_id_for(commit_sha: &str, at: DateTime<Utc>) -> String {
        format!("{commit_sha}-{}", at.format("%Y%m%dT%H%M%S%.3fZ"))
    }
}
