//! Extraction transport port.
//!
//! One structured-completion call against a language model. The transport
//! knows nothing about projects or months; it moves a prompt and a JSON
//! schema out and raw content back.
//!
//! # Errors
//!
//! Transient failures (timeouts, connection drops, 5xx, rate limiting) are
//! the only ones a retrying wrapper may repeat. Everything else, including
//! a well-formed response with the wrong content, is final at this layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Role of a message sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A message in the model request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A structured-completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Short name used for latency metrics and logs, e.g. `extract_project`.
    pub operation: String,
    pub system_prompt: String,
    pub messages: Vec<ChatMessage>,
    /// JSON schema the response content must satisfy.
    pub schema: serde_json::Value,
    pub temperature: f32,
}

impl TransportRequest {
    pub fn new(operation: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            system_prompt: system_prompt.into(),
            messages: Vec::new(),
            schema: serde_json::Value::Null,
            temperature: 0.0,
        }
    }

    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = schema;
        self
    }
}

/// Token counts reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// What the model sent back, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelResponse {
    /// First choice content; `None` if the provider returned none.
    pub content: Option<String>,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

impl RawModelResponse {
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            model: String::new(),
            usage: None,
        }
    }
}

/// Transport-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The call did not finish before its deadline.
    #[error("request timed out after {}ms", elapsed.as_millis())]
    Timeout { elapsed: Duration },

    /// Could not reach the endpoint or the connection dropped.
    #[error("connection error: {0}")]
    Connection(String),

    /// 5xx from the provider.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("rate limited by provider")]
    RateLimited,

    /// 4xx other than auth and rate limiting.
    #[error("client error {status}: {message}")]
    Client { status: u16, message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    /// Body could not be decoded as a completion response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    pub fn timeout(elapsed: Duration) -> Self {
        Self::Timeout { elapsed }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn client(status: u16, message: impl Into<String>) -> Self {
        Self::Client {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// True for failures worth repeating after a backoff.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Connection(_) | Self::Server { .. } | Self::RateLimited
        )
    }
}

/// Port for a single structured-completion call.
#[async_trait]
pub trait ExtractionTransport: Send + Sync {
    async fn execute(&self, request: &TransportRequest) -> Result<RawModelResponse, TransportError>;
}
