//! Analysis result envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FileSummary, OutputFormat};

/// Token accounting reported by the provider, when available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
}

/// What the relay returns for a successful analysis.
///
/// `report` is whatever the provider produced: a parsed JSON document for
/// [`OutputFormat::Json`] or a markdown string for
/// [`OutputFormat::Markdown`]. Its inner schema is up to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub format: OutputFormat,
    pub provider: String,
    pub model: String,
    pub agents: Vec<String>,
    pub files: Vec<FileSummary>,
    pub report: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_serializes_camel_case() {
        let result = AnalysisResult {
            format: OutputFormat::Markdown,
            provider: "anthropic".to_string(),
            model: "claude".to_string(),
            agents: vec!["security".to_string()],
            files: vec![FileSummary {
                name: "z.abap".to_string(),
                size: 3,
            }],
            report: serde_json::Value::String("# Report".to_string()),
            usage: Some(TokenUsage {
                input_tokens: Some(10),
                output_tokens: None,
            }),
            generated_at: Utc::now(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["format"], "markdown");
        assert_eq!(json["report"], "# Report");
        assert_eq!(json["usage"]["inputTokens"], 10);
        assert!(json["usage"].get("outputTokens").is_none());
        assert!(json.get("generatedAt").is_some());
        assert_eq!(json["files"][0]["name"], "z.abap");
    }
}
