//! Uploaded source files.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Extension every uploaded file must carry (compared case-insensitively).
pub const ABAP_EXTENSION: &str = ".abap";

/// Check whether a file name ends in `.abap`, ignoring case.
pub fn has_abap_extension(name: &str) -> bool {
    name.len() >= ABAP_EXTENSION.len()
        && name
            .get(name.len() - ABAP_EXTENSION.len()..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(ABAP_EXTENSION))
}

/// A single file selected for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// File name as supplied by the user (no directory components).
    pub name: String,
    /// Raw file content.
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn is_abap(&self) -> bool {
        has_abap_extension(&self.name)
    }

    /// Content decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    pub fn summary(&self) -> FileSummary {
        FileSummary {
            name: self.name.clone(),
            size: self.size(),
        }
    }
}

/// Name and size of a file, echoed back in analysis results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub name: String,
    pub size: u64,
}
