//! HTTP client for the analysis server and the controller driving it.

mod controller;

pub use controller::{
    AnalysisController, AnalysisState, EXTENSION_MESSAGE, NO_API_KEY_MESSAGE, NO_FILE_MESSAGE,
};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::models::{AnalysisSettings, UploadedFile};

/// Longest error body echoed back when the server returns no JSON error.
const MAX_DETAIL_CHARS: usize = 300;

/// Errors from talking to the analysis server.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

/// The two calls a client makes against the server.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// `GET /api/config`.
    async fn fetch_config(&self) -> Result<ProviderConfig, ClientError>;

    /// `POST /api/analyze` with the files and settings as multipart parts.
    async fn analyze(
        &self,
        files: &[UploadedFile],
        settings: &AnalysisSettings,
    ) -> Result<serde_json::Value, ClientError>;
}

/// Transport backed by a running abapscan server.
#[derive(Debug, Clone)]
pub struct RelayClient {
    base_url: String,
    http: Client,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, Client::new())
    }

    pub fn with_http_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                detail: error_detail(status, &body),
            });
        }

        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Pull the message out of `{"error": "..."}`, falling back to the raw body.
fn error_detail(status: reqwest::StatusCode, body: &[u8]) -> String {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(message) = json.get("error").and_then(|e| e.as_str()) {
            return message.to_string();
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }
    text.chars().take(MAX_DETAIL_CHARS).collect()
}

#[async_trait]
impl AnalysisTransport for RelayClient {
    async fn fetch_config(&self) -> Result<ProviderConfig, ClientError> {
        let response = self
            .http
            .get(self.url("/api/config"))
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Self::read_json(response).await
    }

    async fn analyze(
        &self,
        files: &[UploadedFile],
        settings: &AnalysisSettings,
    ) -> Result<serde_json::Value, ClientError> {
        let settings_json =
            serde_json::to_string(settings).map_err(|e| ClientError::Decode(e.to_string()))?;

        let mut form = Form::new();
        for file in files {
            form = form.part(
                "files",
                Part::bytes(file.content.clone()).file_name(file.name.clone()),
            );
        }
        form = form.text("settings", settings_json);

        debug!(files = files.len(), url = %self.url("/api/analyze"), "Uploading for analysis");

        let response = self
            .http
            .post(self.url("/api/analyze"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Self::read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutputFormat;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_config_applies_defaults_for_absent_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/config"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"apiKey": "sk-1", "apiBaseUrl": ""})),
            )
            .mount(&server)
            .await;

        let client = RelayClient::new(format!("{}/", server.uri()));
        let config = client.fetch_config().await.unwrap();

        assert_eq!(config.api_key, "sk-1");
        assert_eq!(config.api_provider, crate::config::DEFAULT_PROVIDER);
        assert_eq!(config.model_name, crate::config::DEFAULT_MODEL);
        assert_eq!(config.api_base_url, "");
    }

    #[tokio::test]
    async fn test_analyze_sends_files_and_settings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .and(body_string_contains("name=\"files\""))
            .and(body_string_contains("filename=\"ZTEST.abap\""))
            .and(body_string_contains("REPORT ztest."))
            .and(body_string_contains("\"outputFormat\":\"markdown\""))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"report": "ok"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = RelayClient::new(server.uri());
        let settings = AnalysisSettings {
            output_format: OutputFormat::Markdown,
            ..Default::default()
        };
        let result = client
            .analyze(&[UploadedFile::new("ZTEST.abap", "REPORT ztest.")], &settings)
            .await
            .unwrap();

        assert_eq!(result["report"], "ok");
    }

    #[tokio::test]
    async fn test_analyze_error_uses_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(502)
                    .set_body_json(serde_json::json!({"error": "Provider returned HTTP 500: boom"})),
            )
            .mount(&server)
            .await;

        let client = RelayClient::new(server.uri());
        let err = client
            .analyze(&[UploadedFile::new("Z.abap", "x")], &AnalysisSettings::default())
            .await
            .unwrap_err();

        match err {
            ClientError::Http { status, detail } => {
                assert_eq!(status, 502);
                assert_eq!(detail, "Provider returned HTTP 500: boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_analyze_error_without_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = RelayClient::new(server.uri());
        let err = client
            .analyze(&[UploadedFile::new("Z.abap", "x")], &AnalysisSettings::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
    }

    #[tokio::test]
    async fn test_analyze_rejects_non_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = RelayClient::new(server.uri());
        let err = client
            .analyze(&[UploadedFile::new("Z.abap", "x")], &AnalysisSettings::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let client = RelayClient::new("http://127.0.0.1:9");
        let err = client.fetch_config().await.unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
    }
}
