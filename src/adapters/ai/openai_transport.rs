//! OpenAI-compatible chat completions transport.
//!
//! Works against any endpoint that speaks the `/chat/completions` shape,
//! including a local Ollama server. One call per `execute`; retries live in
//! [`RetryingTransport`](super::RetryingTransport).
//!
//! ```ignore
//! let config = OpenAiTransportConfig::new("ollama")
//!     .with_model("llama2")
//!     .with_base_url("http://localhost:11434/v1");
//! let transport = OpenAiTransport::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::ports::{
    ChatRole, ExtractionTransport, RawModelResponse, TokenUsage, TransportError, TransportRequest,
};

#[derive(Debug, Clone)]
pub struct OpenAiTransportConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    /// Whole-request timeout enforced by the HTTP client.
    pub timeout: Duration,
}

impl OpenAiTransportConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "llama2".to_string(),
            base_url: "http://localhost:11434/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

pub struct OpenAiTransport {
    config: OpenAiTransportConfig,
    client: Client,
}

impl OpenAiTransport {
    /// Builds the transport. Fails only if the TLS backend cannot start.
    pub fn new(config: OpenAiTransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::connection(format!("http client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_wire_request(&self, request: &TransportRequest) -> WireRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system_prompt.is_empty() {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: request.system_prompt.clone(),
            });
        }
        for msg in &request.messages {
            messages.push(WireMessage {
                role: match msg.role {
                    ChatRole::System => "system",
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                }
                .to_string(),
                content: msg.content.clone(),
            });
        }

        WireRequest {
            model: self.config.model.clone(),
            messages,
            temperature: request.temperature,
            response_format: ResponseFormat {
                kind: "json_object".to_string(),
            },
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::timeout(self.config.timeout)
        } else if err.is_connect() {
            TransportError::connection(format!("connection failed: {}", err))
        } else {
            TransportError::connection(err.to_string())
        }
    }

    async fn check_status(response: Response) -> Result<Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status.as_u16(), body))
    }
}

/// Maps a non-success HTTP status to a transport error.
fn status_error(status: u16, body: String) -> TransportError {
    match status {
        401 | 403 => TransportError::AuthenticationFailed,
        429 => TransportError::RateLimited,
        500..=599 => TransportError::server(status, body),
        _ => TransportError::client(status, body),
    }
}

#[async_trait]
impl ExtractionTransport for OpenAiTransport {
    async fn execute(&self, request: &TransportRequest) -> Result<RawModelResponse, TransportError> {
        let wire = self.to_wire_request(request);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(&wire)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response).await?;

        let body: WireResponse = response
            .json()
            .await
            .map_err(|e| TransportError::invalid_response(e.to_string()))?;

        let usage = body.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        });
        if let Some(usage) = usage {
            debug!(
                operation = %request.operation,
                model = %body.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "model usage"
            );
        }

        Ok(RawModelResponse {
            content: body.choices.into_iter().next().and_then(|c| c.message.content),
            model: body.model,
            usage,
        })
    }
}

// ----- Wire types -----

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireReply,
}

#[derive(Debug, Deserialize)]
struct WireReply {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
