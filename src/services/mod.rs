//! Service layer for abapscan business logic.
//!
//! Services are shared by the HTTP server and the CLI.

pub mod relay;

pub use relay::{AnalysisRelay, AnalysisRequest, LlmRelay, RelayError};
