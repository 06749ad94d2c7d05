//! Per-request analysis settings.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;

/// Shape of the report the provider is asked to produce.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured findings as a JSON document
    #[default]
    Json,
    /// Free-form markdown report
    Markdown,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "markdown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "markdown" | "md" => Some(Self::Markdown),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options chosen for one analysis request.
///
/// Sent as the JSON `settings` part of the analyze request. Every field may
/// be omitted; empty credential fields fall back to the server's
/// [`ProviderConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisSettings {
    /// Selected agent ids. Empty selects every built-in agent.
    pub agents: BTreeSet<String>,
    pub output_format: OutputFormat,
    pub api_key: String,
    pub api_provider: String,
    pub model_name: String,
    pub api_base_url: String,
}

impl AnalysisSettings {
    /// Copy provider credentials from a fetched configuration.
    pub fn with_provider(mut self, provider: &ProviderConfig) -> Self {
        self.api_key = provider.api_key.clone();
        self.api_provider = provider.api_provider.clone();
        self.model_name = provider.model_name.clone();
        self.api_base_url = provider.api_base_url.clone();
        self
    }

    /// Resolve the provider to call: non-empty request fields win over the
    /// server defaults.
    pub fn merged_over(&self, defaults: &ProviderConfig) -> ProviderConfig {
        fn pick(value: &str, fallback: &str) -> String {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                fallback.to_string()
            } else {
                trimmed.to_string()
            }
        }

        ProviderConfig {
            api_key: pick(&self.api_key, &defaults.api_key),
            api_provider: pick(&self.api_provider, &defaults.api_provider),
            model_name: pick(&self.model_name, &defaults.model_name),
            api_base_url: pick(&self.api_base_url, &defaults.api_base_url),
        }
    }
}
