//! Analysis relay: uploaded files + settings in, provider report out.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Settings;
use crate::llm::{
    build_system_prompt, build_user_prompt, parse_report, LlmClient, LlmConfig, LlmError,
};
use crate::models::{resolve_agents, AnalysisResult, AnalysisSettings, UnknownAgent, UploadedFile};

/// One analysis request as received by the server.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub files: Vec<UploadedFile>,
    pub settings: AnalysisSettings,
}

/// Errors from relaying an analysis.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    UnknownAgent(#[from] UnknownAgent),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Something that can turn an analysis request into a result.
///
/// The server only depends on this trait so handlers can be exercised
/// without a provider.
#[async_trait]
pub trait AnalysisRelay: Send + Sync {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, RelayError>;
}

/// Relay backed by a real LLM provider.
pub struct LlmRelay {
    settings: Arc<Settings>,
    http: reqwest::Client,
}

impl LlmRelay {
    /// Create a relay with one pooled HTTP client for all provider calls.
    pub fn new(settings: Arc<Settings>) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| LlmError::Client(e.to_string()))?;
        Ok(Self { settings, http })
    }
}

#[async_trait]
impl AnalysisRelay for LlmRelay {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, RelayError> {
        let agents = resolve_agents(&request.settings.agents)?;
        let provider = request.settings.merged_over(&self.settings.provider);
        let config = LlmConfig::from_provider(&provider, &self.settings)?;
        let format = request.settings.output_format;

        let system_prompt = build_system_prompt(&agents, format);
        let user_prompt = build_user_prompt(&request.files, self.settings.max_content_chars);
        if user_prompt.truncated {
            warn!(
                max_content_chars = self.settings.max_content_chars,
                "Source exceeds content limit, sending truncated files"
            );
        }

        let started = Instant::now();
        let client = LlmClient::with_http_client(config, self.http.clone());
        let completion = client
            .complete(&system_prompt, &user_prompt.text, format)
            .await?;
        let report = parse_report(&completion.text, format)?;

        info!(
            provider = %client.config().provider_name,
            model = %completion.model,
            files = request.files.len(),
            format = %format,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis complete"
        );

        Ok(AnalysisResult {
            format,
            provider: client.config().provider_name.clone(),
            model: completion.model,
            agents: agents.iter().map(|a| a.id.to_string()).collect(),
            files: request.files.iter().map(UploadedFile::summary).collect(),
            report,
            usage: completion.usage,
            generated_at: Utc::now(),
        })
    }
}
