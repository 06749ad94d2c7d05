//! Turning model text into a report value.

use serde_json::Value;

use super::LlmError;
use crate::models::OutputFormat;

/// Convert a completion into the report returned to the caller.
///
/// JSON reports are parsed; markdown reports are passed through as a string.
pub fn parse_report(text: &str, format: OutputFormat) -> Result<Value, LlmError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(LlmError::Parse("Empty response from provider".to_string()));
    }

    match format {
        OutputFormat::Markdown => Ok(Value::String(trimmed.to_string())),
        OutputFormat::Json => extract_json(trimmed),
    }
}

/// Parse the JSON document in a model reply, tolerating code fences and
/// chatter before or after it.
fn extract_json(text: &str) -> Result<Value, LlmError> {
    let unfenced = strip_code_fence(text);
    if let Ok(value) = serde_json::from_str::<Value>(unfenced) {
        if value.is_object() || value.is_array() {
            return Ok(value);
        }
    }

    let start = unfenced.find(&['{', '['][..]);
    let end = unfenced.rfind(&['}', ']'][..]);
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&unfenced[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(LlmError::Parse(
        "Provider response did not contain a JSON document".to_string(),
    ))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().trim_end_matches("```").trim()
}
