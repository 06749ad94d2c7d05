//! Shared helper functions for CLI commands.

use std::path::{Path, PathBuf};

use console::{style, StyledObject};

use crate::models::UploadedFile;

pub fn success() -> StyledObject<&'static str> {
    style("✓").green()
}

pub fn failure() -> StyledObject<&'static str> {
    style("✗").red()
}

pub fn arrow() -> StyledObject<&'static str> {
    style("→").cyan()
}

/// Expand `~` and environment variables in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => path.to_path_buf(),
    }
}

/// Read a local file into an upload named after its final path component.
pub fn read_upload(path: &Path) -> anyhow::Result<UploadedFile> {
    let path = expand_path(path);
    let content = std::fs::read(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadedFile::new(name, content))
}

/// Render an analysis response for the terminal or an output file.
///
/// Markdown reports are printed as-is; everything else as pretty JSON.
pub fn render_result(result: &serde_json::Value) -> anyhow::Result<String> {
    if result.get("format").and_then(|f| f.as_str()) == Some("markdown") {
        if let Some(report) = result.get("report").and_then(|r| r.as_str()) {
            return Ok(format!("{}\n", report));
        }
    }
    Ok(format!("{}\n", serde_json::to_string_pretty(result)?))
}
