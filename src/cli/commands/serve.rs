//! Web server command.

use console::style;

use crate::cli::helpers::arrow;
use crate::config::{Settings, DEFAULT_BIND};

/// Start the web server.
pub async fn cmd_serve(mut settings: Settings, bind: Option<&str>) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        settings.bind = parse_bind_address(bind);
    }

    println!(
        "{} Starting abapscan server at http://{}",
        arrow(),
        settings.bind
    );
    println!(
        "  {} provider {} / model {}",
        style("→").dim(),
        settings.provider.api_provider,
        settings.provider.model_name
    );
    if !settings.provider.has_api_key() {
        println!(
            "  {} No API key in environment; clients must send one",
            style("!").yellow()
        );
    }
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings).await
}

/// Parse a bind address that can be:
/// - Just a port: "3030" -> 127.0.0.1:3030
/// - Just a host: "0.0.0.0" -> 0.0.0.0:3030
/// - Host and port: "0.0.0.0:3030" -> 0.0.0.0:3030
fn parse_bind_address(bind: &str) -> String {
    let default_port = DEFAULT_BIND
        .rsplit_once(':')
        .map(|(_, port)| port)
        .unwrap_or("3030");

    if bind.parse::<u16>().is_ok() {
        return format!("127.0.0.1:{}", bind);
    }

    if let Some((_, port_str)) = bind.rsplit_once(':') {
        if port_str.parse::<u16>().is_ok() {
            return bind.to_string();
        }
    }

    format!("{}:{}", bind, default_port)
}
