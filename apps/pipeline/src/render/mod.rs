//! Renderer: Markdown to HTML, via Bedrock when possible.
//!
//! Two `Renderer` backends: `ModelRenderer` (primary) and `MarkdownRenderer`
//! (deterministic fallback). `render_with_fallback` is the only place that
//! decides between them.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::llm_client::LlmError;
use crate::models::ModelUsed;

pub mod markdown;
pub mod model;
pub mod prompts;

pub use markdown::MarkdownRenderer;
pub use model::ModelRenderer;

/// HTML produced by a single backend.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub html: String,
    pub model_used: ModelUsed,
}

/// A Markdown-to-HTML backend. The deterministic backend uses `Infallible`.
#[async_trait]
pub trait Renderer: Send + Sync {
    type Error: std::error::Error + Send;

    async fn render(&self, markdown: &str) -> Result<Rendered, Self::Error>;
}

/// Result of the render step, whichever backend produced it.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub html: String,
    pub model_used: ModelUsed,
    /// `LlmError::kind()` of the primary failure, when the fallback ran.
    pub fallback_reason: Option<String>,
}

/// Tries `primary` once; any error is logged and the deterministic renderer
/// takes over. Never fails.
pub async fn render_with_fallback(
    primary: Option<&dyn Renderer<Error = LlmError>>,
    markdown: &str,
) -> RenderOutcome {
    let Some(primary) = primary else {
        info!("Rendering with deterministic Markdown renderer (model disabled)");
        return fallback(markdown, "disabled").await;
    };

    match primary.render(markdown).await {
        Ok(rendered) => {
            info!(
                "Rendered HTML with {} ({} bytes)",
                rendered.model_used,
                rendered.html.len()
            );
            RenderOutcome {
                html: rendered.html,
                model_used: rendered.model_used,
                fallback_reason: None,
            }
        }
        Err(e) if e.is_throttling() => {
            warn!("Bedrock throttled the render call ({e}); falling back to deterministic rendering");
            fallback(markdown, e.kind()).await
        }
        Err(e) => {
            warn!(
                "Bedrock render failed ({}: {e}); falling back to deterministic rendering",
                e.kind()
            );
            fallback(markdown, e.kind()).await
        }
    }
}

async fn fallback(markdown: &str, reason: &str) -> RenderOutcome {
    let rendered = match MarkdownRenderer.render(markdown).await {
        Ok(rendered) => rendered,
        Err(never) => match never {},
    };
    RenderOutcome {
        html: rendered.html,
        model_used: rendered.model_used,
        fallback_reason: Some(reason.to_string()),
    }
}
