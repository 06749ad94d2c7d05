//! API error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::llm::LlmError;
use crate::services::RelayError;

/// Errors returned by API handlers. Rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request data
    #[error("{message}")]
    BadRequest { message: String },

    /// Upload exceeds a configured limit
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// Failure while relaying to the provider
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Relay(RelayError::UnknownAgent(_)) => StatusCode::BAD_REQUEST,
            ApiError::Relay(RelayError::Llm(err)) => match err {
                LlmError::MissingApiKey { .. } | LlmError::UnsupportedProvider(_) => {
                    StatusCode::BAD_REQUEST
                }
                LlmError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                LlmError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
                LlmError::Connection(_) | LlmError::Api { .. } | LlmError::Parse(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Analysis failed: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "Client error: {}", self);
        }

        (
            status,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnknownAgent;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RelayError::UnknownAgent(UnknownAgent("x".into()))).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RelayError::Llm(LlmError::MissingApiKey {
                provider: "openai".into()
            }))
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RelayError::Llm(LlmError::Api {
                status: 500,
                message: "boom".into()
            }))
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(RelayError::Llm(LlmError::Timeout(300))).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(RelayError::Llm(LlmError::Connection("refused".into()))).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(RelayError::Llm(LlmError::Parse("no json".into()))).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::PayloadTooLarge {
                message: "too big".into()
            }
            .status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::bad_request("No files uploaded").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "No files uploaded");
    }
}
