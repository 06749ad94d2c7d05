//! Analysis upload handler.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};

use super::super::error::ApiError;
use super::super::AppState;
use crate::models::{has_abap_extension, AnalysisResult, AnalysisSettings, UploadedFile};
use crate::services::AnalysisRequest;

/// Multipart field carrying one source file (repeatable).
const FILES_FIELD: &str = "files";
/// Multipart field carrying the JSON-encoded settings.
const SETTINGS_FIELD: &str = "settings";

/// Accept uploaded ABAP files plus settings and relay them to the provider.
pub async fn api_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, ApiError> {
    let max_files = state.settings.max_files;
    let mut files: Vec<UploadedFile> = Vec::new();
    let mut settings: Option<AnalysisSettings> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            FILES_FIELD => {
                let name = field
                    .file_name()
                    .map(|n| n.rsplit(&['/', '\\'][..]).next().unwrap_or(n).to_string())
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| ApiError::bad_request("File part is missing a file name"))?;

                if !has_abap_extension(&name) {
                    return Err(ApiError::bad_request(format!(
                        "Unsupported file '{}': only .abap files are accepted",
                        name
                    )));
                }

                let content = field.bytes().await.map_err(multipart_error)?;
                let file = UploadedFile::new(name, content.to_vec());

                if files.len() >= max_files {
                    return Err(ApiError::PayloadTooLarge {
                        message: format!("Too many files: at most {} per request", max_files),
                    });
                }

                tracing::debug!(file = %file.name, size = file.size(), "Received file");
                files.push(file);
            }
            SETTINGS_FIELD => {
                let raw = field.text().await.map_err(multipart_error)?;
                let parsed = if raw.trim().is_empty() {
                    AnalysisSettings::default()
                } else {
                    serde_json::from_str(&raw).map_err(|e| {
                        ApiError::bad_request(format!("Invalid settings: {}", e))
                    })?
                };
                settings = Some(parsed);
            }
            other => {
                tracing::debug!(field = other, "Ignoring unexpected multipart field");
            }
        }
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("No files uploaded"));
    }

    let settings = settings.unwrap_or_default();
    tracing::info!(
        files = files.len(),
        bytes = files.iter().map(UploadedFile::size).sum::<u64>(),
        format = %settings.output_format,
        "Starting analysis"
    );

    let result = state
        .relay
        .analyze(AnalysisRequest { files, settings })
        .await?;

    Ok(Json(result))
}

/// Map multipart parsing failures, keeping body-limit violations as 413.
fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge {
            message: format!("Upload too large: {}", e.body_text()),
        }
    } else {
        ApiError::bad_request(format!("Failed to parse multipart data: {}", e.body_text()))
    }
}
