use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::analysis::prompts::ATS_PROMPT_TEMPLATE;
use crate::analysis::{Analysis, Analyzer};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{invoke_json, InvokeParams, LlmError, TextModel};
use crate::loader::clamp_chars;
use crate::models::analysis::{AtsAnalytics, MAX_LIST_ITEMS, MAX_READABILITY_CHARS};
use crate::models::ModelUsed;

const ATS_PARAMS: InvokeParams = InvokeParams {
    max_tokens: 350,
    temperature: 0.1,
};

/// Bedrock-backed analyzer. One model call per analysis.
pub struct ModelAnalyzer<'a> {
    model: &'a dyn TextModel,
}

impl<'a> ModelAnalyzer<'a> {
    pub fn new(model: &'a dyn TextModel) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Analyzer for ModelAnalyzer<'_> {
    type Error = LlmError;

    async fn analyze(&self, markdown: &str) -> Result<Analysis, LlmError> {
        let prompt = ATS_PROMPT_TEMPLATE.replace("{resume_md}", markdown);
        let raw: ModelAnalytics = invoke_json(self.model, &prompt, JSON_ONLY_SYSTEM, ATS_PARAMS).await?;

        Ok(Analysis {
            analytics: raw.normalize()?,
            model_used: ModelUsed::Model(self.model.model_id().to_string()),
        })
    }
}

/// Analytics as the model returns them. Every key is required; numeric
/// fields are widened so out-of-range values can be clamped, not rejected.
#[derive(Debug, Deserialize)]
struct ModelAnalytics {
    word_count: i64,
    ats_score: i64,
    keywords: Vec<Value>,
    readability: String,
    missing_sections: Vec<Value>,
}

impl ModelAnalytics {
    fn normalize(self) -> Result<AtsAnalytics, LlmError> {
        let word_count = u32::try_from(self.word_count)
            .map_err(|_| LlmError::Schema(format!("word_count out of range: {}", self.word_count)))?;

        Ok(AtsAnalytics {
            word_count,
            ats_score: self.ats_score.clamp(0, 100) as u8,
            keywords: stringify_items(self.keywords),
            readability: clamp_chars(&self.readability, MAX_READABILITY_CHARS).to_string(),
            missing_sections: stringify_items(self.missing_sections),
        })
    }
}

fn stringify_items(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .take(MAX_LIST_ITEMS)
        .map(|item| match item {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::FakeModel;
    use serde_json::json;

    fn raw(value: Value) -> ModelAnalytics {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_score_is_clamped() {
        let analytics = raw(json!({
            "word_count": 10,
            "ats_score": 140,
            "keywords": [],
            "readability": "Good",
            "missing_sections": []
        }))
        .normalize()
        .unwrap();
        assert_eq!(analytics.ats_score, 100);

        let analytics = raw(json!({
            "word_count": 10,
            "ats_score": -3,
            "keywords": [],
            "readability": "Good",
            "missing_sections": []
        }))
        .normalize()
        .unwrap();
        assert_eq!(analytics.ats_score, 0);
    }

    #[test]
    fn test_list_items_are_stringified_and_capped() {
        let keywords: Vec<Value> = (0..60).map(|i| json!(i)).collect();
        let analytics = raw(json!({
            "word_count": 10,
            "ats_score": 50,
            "keywords": keywords,
            "readability": "x".repeat(100),
            "missing_sections": ["Education", 7]
        }))
        .normalize()
        .unwrap();
        assert_eq!(analytics.keywords.len(), MAX_LIST_ITEMS);
        assert_eq!(analytics.keywords[3], "3");
        assert_eq!(analytics.missing_sections, vec!["Education", "7"]);
        assert_eq!(analytics.readability.len(), MAX_READABILITY_CHARS);
    }

    #[test]
    fn test_negative_word_count_rejected() {
        let err = raw(json!({
            "word_count": -1,
            "ats_score": 50,
            "keywords": [],
            "readability": "Good",
            "missing_sections": []
        }))
        .normalize()
        .unwrap_err();
        assert_eq!(err.kind(), "schema_error");
    }

    #[test]
    fn test_missing_key_fails_deserialization() {
        let result: Result<ModelAnalytics, _> = serde_json::from_value(json!({
            "word_count": 10,
            "ats_score": 50,
            "keywords": []
        }));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fenced_reply_is_accepted() {
        let model = FakeModel::new(vec![Ok("```json\n{\"word_count\": 5, \"ats_score\": 61, \
             \"keywords\": [\"aws\"], \"readability\": \"Fair\", \"missing_sections\": []}\n```"
            .to_string())]);
        let analysis = ModelAnalyzer::new(&model).analyze("# Name").await.unwrap();
        assert_eq!(analysis.analytics.ats_score, 61);
        assert_eq!(analysis.analytics.keywords, vec!["aws"]);
    }

    #[tokio::test]
    async fn test_wrong_typed_score_is_schema_error() {
        let reply = r#"{"word_count": 5, "ats_score": "high", "keywords": [], "readability": "Fair", "missing_sections": []}"#;
        let model = FakeModel::new(vec![Ok(reply.to_string())]);
        let err = ModelAnalyzer::new(&model).analyze("# Name").await.unwrap_err();
        assert_eq!(err.kind(), "schema_error");
    }
}
