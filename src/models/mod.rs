//! Data models for abapscan.
//!
//! Everything here is request-scoped: files and settings live only as long
//! as a single analysis request.

mod agent;
mod result;
mod settings;
mod upload;

pub use agent::{find_agent, resolve_agents, Agent, UnknownAgent, AGENTS};
pub use result::{AnalysisResult, TokenUsage};
pub use settings::{AnalysisSettings, OutputFormat};
pub use upload::{has_abap_extension, FileSummary, UploadedFile, ABAP_EXTENSION};
