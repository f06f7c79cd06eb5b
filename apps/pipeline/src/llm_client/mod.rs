//! LLM Client: the single point of entry for all Bedrock calls in the pipeline.
//!
//! No other module talks to `bedrock-runtime` directly. Renderer and analyzer
//! depend on the `TextModel` trait so tests can substitute a fake.
//!
//! Each call is a single attempt. Whatever retry the SDK performs internally
//! is the whole call budget; callers fall back instead of looping.

use async_trait::async_trait;
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Throttled by Bedrock: {0}")]
    Throttled(String),

    #[error("Bedrock call timed out: {0}")]
    Timeout(String),

    #[error("Bedrock unavailable: {0}")]
    Unavailable(String),

    #[error("Bedrock rejected the request: {0}")]
    Rejected(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model output did not match the expected schema: {0}")]
    Schema(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// True for rate-limit and quota signals (as opposed to outages or bad output).
    pub fn is_throttling(&self) -> bool {
        matches!(self, LlmError::Throttled(_))
    }

    /// Stable label recorded as the fallback reason.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Throttled(_) => "throttled",
            LlmError::Timeout(_) => "timeout",
            LlmError::Unavailable(_) => "unavailable",
            LlmError::Rejected(_) => "rejected",
            LlmError::Model(_) => "model_error",
            LlmError::Parse(_) => "parse_error",
            LlmError::Schema(_) => "schema_error",
            LlmError::EmptyContent => "empty_content",
        }
    }
}

/// Per-call generation knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvokeParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A text-generation backend addressed by model identifier.
#[async_trait]
pub trait TextModel: Send + Sync {
    fn model_id(&self) -> &str;

    async fn invoke(
        &self,
        prompt: &str,
        system: &str,
        params: InvokeParams,
    ) -> Result<String, LlmError>;
}

/// Calls the model and deserializes its reply as JSON.
/// Tolerates code fences and prose around the object. Text that is not JSON
/// is a `Parse` error; JSON of the wrong shape is a `Schema` error.
pub async fn invoke_json<T: DeserializeOwned>(
    model: &dyn TextModel,
    prompt: &str,
    system: &str,
    params: InvokeParams,
) -> Result<T, LlmError> {
    let text = model.invoke(prompt, system, params).await?;
    let json = extract_json_object(&text)?;
    serde_json::from_value(json).map_err(|e| LlmError::Schema(e.to_string()))
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    anthropic_version: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "is_blank")]
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

fn is_blank(s: &&str) -> bool {
    s.is_empty()
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Joins every text block, in order, separated by newlines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

/// Bedrock Runtime client speaking the Anthropic messages body format.
#[derive(Clone)]
pub struct BedrockClient {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl BedrockClient {
    pub fn new(client: aws_sdk_bedrockruntime::Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl TextModel for BedrockClient {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn invoke(
        &self,
        prompt: &str,
        system: &str,
        params: InvokeParams,
    ) -> Result<String, LlmError> {
        let body = serde_json::to_vec(&AnthropicRequest {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        })?;

        let output = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(classify_sdk_error)?;

        let response: LlmResponse = serde_json::from_slice(output.body().as_ref())?;

        if let Some(usage) = &response.usage {
            debug!(
                "Bedrock call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        let text = response.text();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text)
    }
}

fn classify_sdk_error<R>(err: SdkError<InvokeModelError, R>) -> LlmError
where
    R: std::fmt::Debug,
{
    let detail = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::TimeoutError(_) => LlmError::Timeout(detail),
        SdkError::ServiceError(service) => classify_error_code(service.err().code(), detail),
        _ => LlmError::Unavailable(detail),
    }
}

/// Maps a Bedrock error code onto the fallback taxonomy.
fn classify_error_code(code: Option<&str>, detail: String) -> LlmError {
    match code.unwrap_or_default() {
        "ThrottlingException" | "TooManyRequestsException" | "ServiceQuotaExceededException" => {
            LlmError::Throttled(detail)
        }
        "ModelTimeoutException" | "RequestTimeout" => LlmError::Timeout(detail),
        "AccessDeniedException" | "ValidationException" | "ResourceNotFoundException" => {
            LlmError::Rejected(detail)
        }
        "ModelErrorException" | "ModelStreamErrorException" => LlmError::Model(detail),
        // Daily token quota surfaces with a generic code but a telling message.
        _ if detail.contains("Too many tokens per day") => LlmError::Throttled(detail),
        _ => LlmError::Unavailable(detail),
    }
}

/// Strips ```json / ```html / bare ``` fences from model output.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest
        .trim_start_matches(|c: char| c.is_ascii_alphanumeric())
        .trim_start();
    rest.strip_suffix("```").map(str::trim_end).unwrap_or(rest)
}

/// Parses the whole text as JSON, or else the span from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Result<serde_json::Value, LlmError> {
    let text = strip_code_fences(text);
    let whole = match serde_json::from_str(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let start = text.find('{');
    let end = text.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(serde_json::from_str(&text[start..=end])?),
        _ => Err(LlmError::Parse(whole)),
    }
}
