//! LLM client for ABAP source review.
//!
//! Supports the Anthropic Messages API, OpenAI-compatible chat completions
//! and Ollama's chat API. One call per analysis; no retries.

mod config;
mod prompts;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{OutputFormat, TokenUsage};

pub use config::{LlmConfig, LlmProvider};
pub use prompts::{build_system_prompt, build_user_prompt, UserPrompt};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Longest provider error body echoed back to callers.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No API key configured for provider '{provider}'")]
    MissingApiKey { provider: String },

    #[error("Unsupported provider '{0}' (expected anthropic, openai, groq, together, openrouter, deepseek or ollama)")]
    UnsupportedProvider(String),

    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Provider did not respond within {0}s")]
    Timeout(u64),

    #[error("Provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Raw text reply from a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    /// Model that answered, as reported by the provider.
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// LLM client bound to one provider configuration.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Anthropic Messages API request format.
#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
}

/// OpenAI chat completions request format.
#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

/// Ollama chat request format.
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

/// Error body shared by Anthropic and OpenAI-compatible APIs.
#[derive(Debug, Deserialize)]
struct ProviderErrorResponse {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

impl LlmClient {
    /// Create a client that shares an existing HTTP connection pool.
    pub fn with_http_client(config: LlmConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Send one system/user prompt pair and return the model's text.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        format: OutputFormat,
    ) -> Result<Completion, LlmError> {
        if self.config.provider.requires_api_key() && self.config.api_key.is_none() {
            return Err(LlmError::MissingApiKey {
                provider: self.config.provider_name.clone(),
            });
        }

        debug!(
            provider = %self.config.provider_name,
            model = %self.config.model,
            url = %self.config.request_url(),
            prompt_chars = user_prompt.len(),
            "Calling LLM provider"
        );

        match self.config.provider {
            LlmProvider::Anthropic => self.call_anthropic(system_prompt, user_prompt).await,
            LlmProvider::OpenAI => self.call_openai(system_prompt, user_prompt).await,
            LlmProvider::Ollama => self.call_ollama(system_prompt, user_prompt, format).await,
        }
    }

    /// Call Anthropic Messages API.
    async fn call_anthropic(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Completion, LlmError> {
        let request = AnthropicRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: system_prompt,
            messages: vec![ChatMessage {
                role: "user",
                content: user_prompt,
            }],
        };

        let builder = self
            .client
            .post(self.config.request_url())
            .header("x-api-key", self.config.api_key.as_deref().unwrap_or_default())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request);

        let resp: AnthropicResponse = self.send(builder).await?;

        let text: String = resp
            .content
            .iter()
            .filter(|c| c.kind == "text")
            .filter_map(|c| c.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            return Err(LlmError::Parse("No response content".to_string()));
        }

        Ok(Completion {
            text,
            model: resp.model.unwrap_or_else(|| self.config.model.clone()),
            usage: resp.usage.map(|u| TokenUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        })
    }

    /// Call an OpenAI-compatible chat completions API.
    async fn call_openai(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Completion, LlmError> {
        let request = OpenAIRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let builder = self
            .client
            .post(self.config.request_url())
            .bearer_auth(self.config.api_key.as_deref().unwrap_or_default())
            .json(&request);

        let resp: OpenAIResponse = self.send(builder).await?;

        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| LlmError::Parse("No response content".to_string()))?;

        Ok(Completion {
            text,
            model: resp.model.unwrap_or_else(|| self.config.model.clone()),
            usage: resp.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }

    /// Call Ollama chat API.
    async fn call_ollama(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        format: OutputFormat,
    ) -> Result<Completion, LlmError> {
        let request = OllamaRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            stream: false,
            format: (format == OutputFormat::Json).then_some("json"),
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let builder = self.client.post(self.config.request_url()).json(&request);
        let resp: OllamaResponse = self.send(builder).await?;

        if resp.message.content.trim().is_empty() {
            return Err(LlmError::Parse("No response content".to_string()));
        }

        let usage = (resp.prompt_eval_count.is_some() || resp.eval_count.is_some()).then(|| {
            TokenUsage {
                input_tokens: resp.prompt_eval_count,
                output_tokens: resp.eval_count,
            }
        });

        Ok(Completion {
            text: resp.message.content,
            model: resp.model.unwrap_or_else(|| self.config.model.clone()),
            usage,
        })
    }

    /// Send a request and decode a successful JSON body.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, LlmError> {
        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        let resp = Self::check_status(resp).await?;
        resp.json::<T>()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.config.timeout.as_secs())
        } else {
            LlmError::Connection(e.to_string())
        }
    }

    /// Turn a non-2xx response into [`LlmError::Api`], preferring the
    /// provider's own error message.
    async fn check_status(resp: Response) -> Result<Response, LlmError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ProviderErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.chars().take(MAX_ERROR_BODY_CHARS).collect());

        Err(LlmError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
