pub mod analysis;
pub mod artifact;
pub mod deployment;

use serde::{Serialize, Serializer};

/// Written in place of a model identifier when the deterministic path ran.
pub const FALLBACK_MARKER: &str = "fallback-deterministic";

/// Which backend produced a piece of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelUsed {
    Model(String),
    Fallback,
}

impl ModelUsed {
    pub fn as_str(&self) -> &str {
        match self {
            ModelUsed::Model(id) => id,
            ModelUsed::Fallback => FALLBACK_MARKER,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ModelUsed::Fallback)
    }
}

impl std::fmt::Display for ModelUsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ModelUsed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_serializes_as_marker() {
        let json = serde_json::to_string(&ModelUsed::Fallback).unwrap();
        assert_eq!(json, "\"fallback-deterministic\"");
    }

    #[test]
    fn test_model_serializes_as_identifier() {
        let used = ModelUsed::Model("anthropic.claude-3-haiku-20240307-v1:0".into());
        assert_eq!(used.to_string(), "anthropic.claude-3-haiku-20240307-v1:0");
        assert!(!used.is_fallback());
    }
}
