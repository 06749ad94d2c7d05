//! abapscan - AI-assisted review of ABAP source files.
//!
//! A small relay server that accepts `.abap` uploads, forwards them to a
//! configured LLM provider, and returns the structured report, plus a
//! client for driving it from the command line.

pub mod cli;
pub mod client;
pub mod config;
pub mod llm;
pub mod models;
pub mod server;
pub mod services;
