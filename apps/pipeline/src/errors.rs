use thiserror::Error;

/// Pipeline-level error type. Every variant is fatal for the run;
/// Bedrock failures never reach this type because both steps fall back.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error during {step}: {message}")]
    Storage { step: StorageStep, message: String },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Which publish write failed. Earlier writes in the sequence stay committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStep {
    UploadHtml,
    PutDeployment,
    PutAnalytics,
}

impl std::fmt::Display for StorageStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            StorageStep::UploadHtml => "S3 upload",
            StorageStep::PutDeployment => "deployment record write",
            StorageStep::PutAnalytics => "analytics record write",
        };
        f.write_str(label)
    }
}

impl PipelineError {
    pub fn storage(step: StorageStep, message: impl Into<String>) -> Self {
        PipelineError::Storage {
            step,
            message: message.into(),
        }
    }

    /// Short machine-readable code, logged alongside the error.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Io(_) => "IO_ERROR",
            PipelineError::Storage { .. } => "STORAGE_ERROR",
            PipelineError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
