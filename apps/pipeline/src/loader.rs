use std::path::Path;

use tracing::{info, warn};

use crate::errors::PipelineError;

/// Upper bound on Markdown sent through the pipeline.
pub const MAX_SOURCE_CHARS: usize = 12_000;

/// Raw Markdown resume text, trimmed and clamped. Immutable for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeSource {
    markdown: String,
}

impl ResumeSource {
    pub fn from_markdown(text: &str) -> Self {
        let trimmed = text.trim();
        let markdown = clamp_chars(trimmed, MAX_SOURCE_CHARS);
        if markdown.len() < trimmed.len() {
            warn!(
                "Resume source truncated to {} characters",
                MAX_SOURCE_CHARS
            );
        }
        Self {
            markdown: markdown.to_string(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path)?;
        info!("Loaded resume from {} ({} bytes)", path.display(), text.len());
        Ok(Self::from_markdown(&text))
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }
}

/// Returns at most `max_chars` characters of `text`, cut on a char boundary.
pub fn clamp_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_markdown_trims() {
        let source = ResumeSource::from_markdown("\n\n# Name\n\n");
        assert_eq!(source.markdown(), "# Name");
    }

    #[test]
    fn test_long_source_is_clamped() {
        let text = "a".repeat(MAX_SOURCE_CHARS + 500);
        let source = ResumeSource::from_markdown(&text);
        assert_eq!(source.markdown().chars().count(), MAX_SOURCE_CHARS);
    }

    #[test]
    fn test_clamp_respects_char_boundaries() {
        assert_eq!(clamp_chars("héllo", 2), "hé");
        assert_eq!(clamp_chars("hi", 10), "hi");
    }

    #[test]
    fn test_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# Will Soto\n\n- AWS").unwrap();

        let source = ResumeSource::from_path(file.path()).unwrap();
        assert_eq!(source.markdown(), "# Will Soto\n\n- AWS");
    }

    #[test]
    fn test_from_path_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ResumeSource::from_path(&dir.path().join("resume.md")).unwrap_err();
        assert_eq!(err.code(), "IO_ERROR");
    }
}
