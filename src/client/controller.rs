//! Client-side analysis state machine.

use tracing::{debug, warn};

use super::AnalysisTransport;
use crate::models::{AnalysisSettings, OutputFormat, UploadedFile};

pub const NO_FILE_MESSAGE: &str = "No file selected";
pub const NO_API_KEY_MESSAGE: &str = "API key missing";
pub const EXTENSION_MESSAGE: &str = "Only .abap files are supported";

/// Where the controller is in the analysis lifecycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AnalysisState {
    #[default]
    Idle,
    Analyzing,
    Success(serde_json::Value),
    Error(String),
}

/// Collects files and settings, then performs one analysis call.
///
/// Validation problems go to [`notice`](Self::notice) and never reach the
/// transport. A failed config fetch is kept as a warning and does not block
/// submitting.
pub struct AnalysisController<T> {
    transport: T,
    files: Vec<UploadedFile>,
    settings: AnalysisSettings,
    state: AnalysisState,
    notice: Option<String>,
    config_warning: Option<String>,
}

impl<T: AnalysisTransport> AnalysisController<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            files: Vec::new(),
            settings: AnalysisSettings::default(),
            state: AnalysisState::Idle,
            notice: None,
            config_warning: None,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn config_warning(&self) -> Option<&str> {
        self.config_warning.as_deref()
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, AnalysisState::Analyzing)
    }

    /// Fetch provider settings from the server. Called once; not retried.
    pub async fn load_config(&mut self) {
        match self.transport.fetch_config().await {
            Ok(config) => {
                debug!(provider = %config.api_provider, model = %config.model_name, "Loaded server config");
                self.settings = std::mem::take(&mut self.settings).with_provider(&config);
                self.config_warning = None;
            }
            Err(e) => {
                warn!("Failed to load server config: {}", e);
                self.config_warning = Some(format!("Could not load configuration: {}", e));
            }
        }
    }

    /// Add files, keeping only `.abap` ones. Returns how many were accepted.
    pub fn add_files(&mut self, offered: impl IntoIterator<Item = UploadedFile>) -> usize {
        let mut offered_count = 0;
        let mut accepted = 0;

        for file in offered {
            offered_count += 1;
            if file.is_abap() {
                self.files.push(file);
                accepted += 1;
            } else {
                debug!(file = %file.name, "Skipping non-ABAP file");
            }
        }

        if offered_count > 0 && accepted == 0 {
            self.notice = Some(EXTENSION_MESSAGE.to_string());
        } else if accepted > 0 {
            self.notice = None;
        }
        accepted
    }

    pub fn remove_file(&mut self, index: usize) -> Option<UploadedFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
    }

    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.settings.output_format = format;
    }

    /// Flip an agent in or out of the selection. Returns whether it is now selected.
    pub fn toggle_agent(&mut self, id: &str) -> bool {
        if self.settings.agents.remove(id) {
            false
        } else {
            self.settings.agents.insert(id.to_string());
            true
        }
    }

    /// Override the API key fetched from the server.
    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.settings.api_key = key.into();
    }

    /// Run the analysis if the guards pass.
    pub async fn submit(&mut self) -> &AnalysisState {
        if self.is_analyzing() {
            return &self.state;
        }
        if self.files.is_empty() {
            self.notice = Some(NO_FILE_MESSAGE.to_string());
            return &self.state;
        }
        if self.settings.api_key.trim().is_empty() {
            self.notice = Some(NO_API_KEY_MESSAGE.to_string());
            return &self.state;
        }

        self.notice = None;
        self.state = AnalysisState::Analyzing;

        self.state = match self.transport.analyze(&self.files, &self.settings).await {
            Ok(result) => AnalysisState::Success(result),
            Err(e) => AnalysisState::Error(format!("Analysis failed: {}", e)),
        };
        &self.state
    }
}
