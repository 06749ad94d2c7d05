//! LLM client configuration.

use std::time::Duration;

use crate::config::{ProviderConfig, Settings};

use super::LlmError;

/// Wire protocol spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Anthropic Messages API
    Anthropic,
    /// OpenAI-compatible chat completions (OpenAI, Groq, Together.ai, etc.)
    OpenAI,
    /// Ollama chat API (local, no key)
    Ollama,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Some(Self::Anthropic),
            "openai" | "groq" | "together" | "openrouter" | "deepseek" => Some(Self::OpenAI),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
        }
    }

    /// Default API base for a provider name, including OpenAI-compatible aliases.
    pub fn default_endpoint(name: &str) -> Option<&'static str> {
        match name.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Some("https://api.anthropic.com"),
            "openai" => Some("https://api.openai.com"),
            "groq" => Some("https://api.groq.com/openai"),
            "together" => Some("https://api.together.xyz"),
            "openrouter" => Some("https://openrouter.ai/api"),
            "deepseek" => Some("https://api.deepseek.com"),
            "ollama" => Some("http://localhost:11434"),
            _ => None,
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }

    /// Request path appended to the API base.
    fn api_path(&self) -> &'static str {
        match self {
            Self::Anthropic => "/v1/messages",
            Self::OpenAI => "/v1/chat/completions",
            Self::Ollama => "/api/chat",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved configuration for one provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    /// Provider name as configured (e.g. "groq"), used in results and errors.
    pub provider_name: String,
    /// API base URL without the request path.
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl LlmConfig {
    /// Build a client configuration from provider credentials and server limits.
    pub fn from_provider(provider: &ProviderConfig, settings: &Settings) -> Result<Self, LlmError> {
        let name = provider.api_provider.trim().to_lowercase();
        let kind = LlmProvider::from_str(&name)
            .ok_or_else(|| LlmError::UnsupportedProvider(provider.api_provider.clone()))?;

        let endpoint = if provider.api_base_url.trim().is_empty() {
            LlmProvider::default_endpoint(&name)
                .unwrap_or_default()
                .to_string()
        } else {
            provider.api_base_url.trim().to_string()
        };

        let api_key = Some(provider.api_key.trim().to_string()).filter(|k| !k.is_empty());

        Ok(Self {
            provider: kind,
            provider_name: name,
            endpoint,
            api_key,
            model: provider.model_name.trim().to_string(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: settings.request_timeout,
        })
    }

    /// Full URL of the completion endpoint.
    ///
    /// A base that already ends in `/v1` is not given a second one.
    pub fn request_url(&self) -> String {
        let base = self.endpoint.trim_end_matches('/');
        let path = self.provider.api_path();
        match path.strip_prefix("/v1") {
            Some(rest) if base.ends_with("/v1") => format!("{}{}", base, rest),
            _ => format!("{}{}", base, path),
        }
    }
}
