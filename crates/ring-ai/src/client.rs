use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ChatMessage, ChatRequest, ProviderError, TextGenerator};

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const EMPTY_RESPONSE_MESSAGE: &str = "provider returned an empty response";

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub api_base: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ProviderConfig {
    /// Sets the key from raw configuration text; see [`clean_api_key`].
    pub fn with_api_key(mut self, raw: Option<&str>) -> Self {
        self.api_key = raw.and_then(clean_api_key);
        self
    }
}

/// Trims a configured key and drops a leading and a trailing quote, as left
/// behind by `.env` files. Blank keys count as missing.
pub fn clean_api_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix(is_quote).unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(is_quote).unwrap_or(trimmed);
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Blocking client for OpenAI-compatible `chat/completions` endpoints.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    config: ProviderConfig,
}

impl ChatCompletionsClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

impl TextGenerator for ChatCompletionsClient {
    fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey)?;

        // Built per call so the client's internal runtime lives and dies on the calling thread.
        let http = reqwest::blocking::Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(transport)?;

        let body = CompletionBody::new(&self.config.model, request);
        tracing::debug!(model = %self.config.model, messages = request.messages.len(), "sending chat completion");

        let response = http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().map_err(transport)?;
            let error = error_from_body(status.as_u16(), &details);
            tracing::warn!(status = status.as_u16(), error = %error, "chat completion rejected");
            return Err(error);
        }

        let payload: CompletionPayload = response.json().map_err(transport)?;
        content_from_payload(payload)
    }
}

fn transport(err: reqwest::Error) -> ProviderError {
    ProviderError::Transport(err.to_string())
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

impl<'a> CompletionBody<'a> {
    fn new(model: &'a str, request: &'a ChatRequest) -> Self {
        Self {
            model,
            messages: &request.messages,
            temperature: request.temperature,
            response_format: request.json_object.then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct CompletionPayload {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<Value>,
    #[serde(default)]
    code: Option<Value>,
}

impl ErrorBody {
    fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|message| !message.is_empty())
    }
}

/// Providers send codes as strings or numbers; both are kept as text.
fn detail_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Maps a non-success response body to an error, preferring the structured
/// provider message and falling back to the raw text.
fn error_from_body(status: u16, details: &str) -> ProviderError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(details).unwrap_or_default();
    let error = envelope.error.unwrap_or_default();

    ProviderError::Status {
        status,
        message: error.message().unwrap_or(details).to_string(),
        provider_type: detail_text(error.kind.as_ref()),
        provider_code: detail_text(error.code.as_ref()),
    }
}

fn content_from_payload(payload: CompletionPayload) -> Result<String, ProviderError> {
    let content = payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty());

    content.ok_or_else(|| {
        let error = payload.error.unwrap_or_default();
        ProviderError::EmptyResponse {
            message: error.message().unwrap_or(EMPTY_RESPONSE_MESSAGE).to_string(),
            provider_type: detail_text(error.kind.as_ref()),
            provider_code: detail_text(error.code.as_ref()),
        }
    })
}
