//! Configuration display command.

use std::path::Path;

use console::style;

use crate::config::{Config, Settings};

/// Print the effective settings. The API key is masked.
pub async fn cmd_config(settings: &Settings, explicit: Option<&Path>) -> anyhow::Result<()> {
    let source = match explicit {
        Some(path) => Some(path.display().to_string()),
        None => Config::load()
            .await
            .source_path
            .map(|p| p.display().to_string()),
    };

    println!("{}", style("Configuration").bold());
    println!(
        "  {:<20} {}",
        "config file",
        source.unwrap_or_else(|| style("(none)").dim().to_string())
    );

    println!("\n{}", style("Provider").bold());
    let provider = &settings.provider;
    println!("  {:<20} {}", "apiProvider", provider.api_provider);
    println!("  {:<20} {}", "modelName", provider.model_name);
    println!(
        "  {:<20} {}",
        "apiBaseUrl",
        if provider.api_base_url.is_empty() {
            style("(provider default)").dim().to_string()
        } else {
            provider.api_base_url.clone()
        }
    );
    println!("  {:<20} {}", "apiKey", provider.masked_api_key());

    println!("\n{}", style("Server").bold());
    println!("  {:<20} {}", "bind", settings.bind);
    println!("  {:<20} {}", "max upload bytes", settings.max_upload_bytes);
    println!("  {:<20} {}", "max files", settings.max_files);
    println!(
        "  {:<20} {}s",
        "request timeout",
        settings.request_timeout.as_secs()
    );
    println!("  {:<20} {}", "max tokens", settings.max_tokens);
    println!("  {:<20} {}", "temperature", settings.temperature);
    println!("  {:<20} {}", "max content chars", settings.max_content_chars);

    Ok(())
}
