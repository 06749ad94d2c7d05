//! LLM integration for ABAP source review.
//!
//! The relay hands a system prompt (selected agents plus output contract)
//! and a user prompt (the uploaded sources) to one of the supported
//! providers and turns the reply into a report value.

mod client;
mod report;

pub use client::{
    build_system_prompt, build_user_prompt, Completion, LlmClient, LlmConfig, LlmError,
    LlmProvider, UserPrompt,
};
pub use report::parse_report;
