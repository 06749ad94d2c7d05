//! Configuration management for abapscan.
//!
//! Provider credentials come from the environment only. Server tuning
//! (bind address, upload limits, generation parameters) can additionally be
//! set in an `abapscan.{toml,yaml,json}` file discovered with the prefer
//! crate. Precedence: CLI flags, then environment, then config file, then
//! built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Provider used when `API_PROVIDER` is unset.
pub const DEFAULT_PROVIDER: &str = "anthropic";

/// Model used when `MODEL_NAME` is unset.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Environment variables checked for the API key, first non-empty wins.
pub const API_KEY_VARS: [&str; 3] = ["API_KEY", "OPENAI_API_KEY", "ANTHROPIC_API_KEY"];

pub const DEFAULT_BIND: &str = "127.0.0.1:3030";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_MAX_FILES: usize = 50;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 200_000;

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// AI provider credentials and selection.
///
/// This is also the body of `GET /api/config`. When deserializing a config
/// response, absent fields take the same defaults the server applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_provider")]
    pub api_provider: String,
    #[serde(default = "default_model")]
    pub model_name: String,
    #[serde(default)]
    pub api_base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_provider: default_provider(),
            model_name: default_model(),
            api_base_url: String::new(),
        }
    }
}

impl ProviderConfig {
    /// Read provider settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read provider settings through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_key: API_KEY_VARS
                .iter()
                .find_map(|key| var(*key))
                .unwrap_or_default(),
            api_provider: var("API_PROVIDER").unwrap_or_else(default_provider),
            model_name: var("MODEL_NAME").unwrap_or_else(default_model),
            api_base_url: var("API_BASE_URL").unwrap_or_default(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// API key with everything but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        let key = self.api_key.trim();
        if key.is_empty() {
            return "(not set)".to_string();
        }
        let chars: Vec<char> = key.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), tail)
    }
}

/// Runtime settings for the server and relay.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the HTTP server binds to.
    pub bind: String,
    /// Maximum multipart body size for `/api/analyze`.
    pub max_upload_bytes: usize,
    /// Maximum number of files in one analysis request.
    pub max_files: usize,
    /// Timeout for a single provider call.
    pub request_timeout: Duration,
    /// Maximum tokens the provider may generate.
    pub max_tokens: u32,
    pub temperature: f32,
    /// Maximum characters of source sent per request (UTF-8 safe truncation).
    pub max_content_chars: usize,
    /// Provider credentials from the environment.
    pub provider: ProviderConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_files: DEFAULT_MAX_FILES,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
            provider: ProviderConfig::default(),
        }
    }
}

impl Settings {
    /// Apply `ABAPSCAN_*` overrides and provider variables from a lookup.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = var("ABAPSCAN_BIND") {
            self.bind = bind;
        }
        if let Some(n) = parse_var(&var, "ABAPSCAN_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = n;
        }
        if let Some(n) = parse_var(&var, "ABAPSCAN_MAX_FILES") {
            self.max_files = n;
        }
        if let Some(secs) = parse_var::<u64, _>(&var, "ABAPSCAN_REQUEST_TIMEOUT") {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = parse_var(&var, "ABAPSCAN_MAX_TOKENS") {
            self.max_tokens = n;
        }
        if let Some(t) = parse_var(&var, "ABAPSCAN_TEMPERATURE") {
            self.temperature = t;
        }
        if let Some(n) = parse_var(&var, "ABAPSCAN_MAX_CONTENT_CHARS") {
            self.max_content_chars = n;
        }

        self.provider = ProviderConfig::from_lookup(&lookup);
    }
}

fn parse_var<T, F>(var: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = var(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,
    /// Provider request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_content_chars: Option<usize>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Discover an `abapscan` config file with prefer, falling back to an
    /// empty config when none exists or it cannot be parsed.
    pub async fn load() -> Self {
        match prefer::load("abapscan").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("{}", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

        let mut config: Config = match ext {
            "json" => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply configured values to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
        if let Some(n) = self.max_upload_bytes {
            settings.max_upload_bytes = n;
        }
        if let Some(n) = self.max_files {
            settings.max_files = n;
        }
        if let Some(secs) = self.request_timeout {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = self.max_tokens {
            settings.max_tokens = n;
        }
        if let Some(t) = self.temperature {
            settings.temperature = t;
        }
        if let Some(n) = self.max_content_chars {
            settings.max_content_chars = n;
        }
    }
}

/// Build settings from defaults, the config file and the environment.
///
/// An explicit `config_path` must exist and parse; a discovered file that
/// fails to parse is skipped.
pub async fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let config = match config_path {
        Some(path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            Config::load_from_path(Path::new(&expanded))
                .await
                .map_err(|e| anyhow::anyhow!(e))?
        }
        None => Config::load().await,
    };

    if let Some(ref path) = config.source_path {
        tracing::debug!("Using config file {}", path.display());
    }

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(settings)
}
