use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

mod client;
mod interpret;
mod prompt;

pub use client::{
    ChatCompletionsClient, DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TIMEOUT, ProviderConfig,
    clean_api_key,
};
pub use interpret::{ConceptDraft, DEFAULT_SYMBOLS, interpret_response};
pub use prompt::{SYSTEM_PROMPT, build_concept_prompt, concept_request};

/// Accepted story length, in characters.
pub const MIN_PROMPT_CHARS: usize = 10;
pub const MAX_PROMPT_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// One completion call: ordered messages, sampling temperature, and whether the
/// provider must answer with a single JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub json_object: bool,
}

impl ChatRequest {
    /// Deterministic request constrained to a JSON object answer.
    pub fn json(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: 0.0,
            json_object: true,
        }
    }
}

/// Failure of the text-generation call itself. Content that arrives but cannot
/// be interpreted is not an error; see [`interpret_response`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("text generation request failed ({status}): {message}")]
    Status {
        status: u16,
        message: String,
        provider_type: Option<String>,
        provider_code: Option<String>,
    },
    #[error("text generation request failed (502): {message}")]
    EmptyResponse {
        message: String,
        provider_type: Option<String>,
        provider_code: Option<String>,
    },
    #[error("text generation request failed (502): {0}")]
    Transport(String),
    #[error("text generation API key is not configured")]
    MissingApiKey,
}

impl ProviderError {
    /// Status reported for this failure; 500 marks a local configuration problem.
    pub fn status_code(&self) -> u16 {
        match self {
            ProviderError::Status { status, .. } => *status,
            ProviderError::EmptyResponse { .. } | ProviderError::Transport(_) => 502,
            ProviderError::MissingApiKey => 500,
        }
    }

    /// True when the provider was reached or attempted, as opposed to a local failure.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, ProviderError::MissingApiKey)
    }
}

/// Source of chat completions. Implementations may block.
pub trait TextGenerator: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        (**self).complete(request)
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        (**self).complete(request)
    }
}

/// Turns a story prompt into symbols and ring parameters with one provider call.
pub struct ConceptGenerator<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> ConceptGenerator<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn into_generator(self) -> G {
        self.generator
    }

    /// Calls the provider once, without retry. Provider failures propagate;
    /// anything the provider says is absorbed into a usable draft.
    ///
    /// `prompt` is expected to be validated by the caller.
    pub fn generate_concept(&self, prompt: &str) -> Result<ConceptDraft, ProviderError> {
        let content = self.generator.complete(&concept_request(prompt))?;
        let draft = interpret_response(&content);
        tracing::info!(symbols = ?draft.symbols, "concept generated");
        Ok(draft)
    }
}
