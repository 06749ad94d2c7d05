//! HTTP request handlers for the web server.

mod analyze;
mod api;

// Re-export handlers for use by the router
pub use analyze::api_analyze;
pub use api::{api_agents, api_config, health};
