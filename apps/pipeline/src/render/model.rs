use async_trait::async_trait;
use tracing::debug;

use crate::llm_client::prompts::{FIDELITY_INSTRUCTION, HTML_ONLY_SYSTEM};
use crate::llm_client::{strip_code_fences, InvokeParams, LlmError, TextModel};
use crate::loader::clamp_chars;
use crate::models::ModelUsed;
use crate::render::prompts::HTML_PROMPT_TEMPLATE;
use crate::render::{Rendered, Renderer};

pub const MAX_HTML_CHARS: usize = 120_000;

const HTML_PARAMS: InvokeParams = InvokeParams {
    max_tokens: 4000,
    temperature: 0.2,
};

/// Bedrock-backed renderer. One model call per render.
pub struct ModelRenderer<'a> {
    model: &'a dyn TextModel,
}

impl<'a> ModelRenderer<'a> {
    pub fn new(model: &'a dyn TextModel) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Renderer for ModelRenderer<'_> {
    type Error = LlmError;

    async fn render(&self, markdown: &str) -> Result<Rendered, LlmError> {
        let prompt = HTML_PROMPT_TEMPLATE
            .replace("{fidelity_instruction}", FIDELITY_INSTRUCTION)
            .replace("{resume_md}", markdown);

        let raw = self.model.invoke(&prompt, HTML_ONLY_SYSTEM, HTML_PARAMS).await?;
        debug!("Model returned {} bytes of HTML", raw.len());

        Ok(Rendered {
            html: sanitize_html(&raw)?,
            model_used: ModelUsed::Model(self.model.model_id().to_string()),
        })
    }
}

/// Strips code fences, rejects output with no markup, clamps the length.
fn sanitize_html(raw: &str) -> Result<String, LlmError> {
    let html = strip_code_fences(raw);
    if html.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    if !html.contains('<') {
        return Err(LlmError::Schema("model output contains no HTML markup".to_string()));
    }
    Ok(clamp_chars(html, MAX_HTML_CHARS).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::FakeModel;

    #[test]
    fn test_sanitize_strips_fences() {
        let html = sanitize_html("```html\n<!doctype html><p>x</p>\n```").unwrap();
        assert_eq!(html, "<!doctype html><p>x</p>");
    }

    #[test]
    fn test_sanitize_rejects_prose() {
        let err = sanitize_html("Sorry, I can't help with that.").unwrap_err();
        assert_eq!(err.kind(), "schema_error");
    }

    #[test]
    fn test_sanitize_clamps_length() {
        let raw = format!("<p>{}</p>", "x".repeat(MAX_HTML_CHARS));
        assert_eq!(sanitize_html(&raw).unwrap().chars().count(), MAX_HTML_CHARS);
    }

    #[tokio::test]
    async fn test_prompt_carries_markdown() {
        let model = FakeModel::new(vec![Ok("<h1>Name</h1>".to_string())]);
        ModelRenderer::new(&model).render("# Name").await.unwrap();

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("RESUME_MARKDOWN:\n# Name"));
        assert!(!prompts[0].contains("{resume_md}"));
    }

    #[tokio::test]
    async fn test_empty_reply_is_an_error() {
        let model = FakeModel::new(vec![Ok("```html\n```".to_string())]);
        let err = ModelRenderer::new(&model).render("# Name").await.unwrap_err();
        assert_eq!(err.kind(), "empty_content");
    }
}
