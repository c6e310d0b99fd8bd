//! Text-generation backends used to produce summaries.
//!
//! Both adapters speak plain HTTP to their runtime. A call yields zero or more replies; an empty
//! reply list is not an error, the caller decides what that means.

use crate::config::{Config, GenerationProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

const USER_AGENT: &str = concat!("hn-summarizer/", env!("CARGO_PKG_VERSION"));

/// Errors surfaced by a text-generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Provider could not be reached or the request timed out.
    #[error("Generation provider unavailable: {0}")]
    Transport(String),
    /// Provider answered with a non-success status.
    #[error("Generation provider returned {status}: {body}")]
    Status {
        /// HTTP status returned by the provider.
        status: StatusCode,
        /// Response body, possibly empty.
        body: String,
    },
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
    /// Provider requires a credential that was not configured.
    #[error("Missing credential for generation provider: {0}")]
    MissingCredential(&'static str),
}

/// A single generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Fully rendered prompt.
    pub prompt: String,
    /// Model identifier understood by the provider.
    pub model: String,
    /// Sampling temperature in `[0, 1]`.
    pub temperature: f32,
}

/// Interface implemented by text-generation providers.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate replies for the given prompt; the list may be empty.
    async fn generate(&self, request: GenerationRequest) -> Result<Vec<String>, GenerationError>;
}

/// Build the generator selected by configuration.
pub fn build_text_generator(config: &Config) -> Result<Arc<dyn TextGenerator>, GenerationError> {
    let http = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.generation_timeout)
        .build()
        .map_err(|error| GenerationError::Transport(error.to_string()))?;

    match config.generation_provider {
        GenerationProvider::OpenAI => {
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or(GenerationError::MissingCredential("OPENAI_API_KEY"))?;
            tracing::debug!(base_url = %config.openai_base_url, "Using OpenAI generator");
            Ok(Arc::new(OpenAiGenerator::new(
                http,
                config.openai_base_url.clone(),
                api_key,
            )))
        }
        GenerationProvider::Ollama => {
            tracing::debug!(base_url = %config.ollama_url, "Using Ollama generator");
            Ok(Arc::new(OllamaGenerator::new(http, config.ollama_url.clone())))
        }
    }
}

/// Chat-completions client for OpenAI-compatible APIs.
pub struct OpenAiGenerator {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiGenerator {
    /// Create a client for the API rooted at `base_url` (for example `https://api.openai.com/v1`).
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<Vec<String>, GenerationError> {
        let payload = json!({
            "model": request.model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "temperature": request.temperature,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                GenerationError::Transport(format!(
                    "failed to reach {}: {error}",
                    self.base_url
                ))
            })?;

        let response = check_status(response).await?;
        let body: ChatResponse = response.json().await.map_err(|error| {
            GenerationError::InvalidResponse(format!(
                "failed to decode chat completion: {error}"
            ))
        })?;

        Ok(body
            .choices
            .into_iter()
            .filter_map(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .collect())
    }
}

/// Client for a local Ollama runtime.
pub struct OllamaGenerator {
    http: Client,
    base_url: String,
}

impl OllamaGenerator {
    /// Create a client for the runtime at `base_url`.
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<Vec<String>, GenerationError> {
        let payload = json!({
            "model": request.model,
            "prompt": request.prompt,
            "stream": false,
            "options": {
                "temperature": request.temperature,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                GenerationError::Transport(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        let response = check_status(response).await?;
        let body: OllamaResponse = response.json().await.map_err(|error| {
            GenerationError::InvalidResponse(format!("failed to decode Ollama response: {error}"))
        })?;

        let reply = body.response.trim();
        if !body.done || reply.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![reply.to_string()])
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GenerationError::Status { status, body })
}
