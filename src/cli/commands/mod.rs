//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod agents;
mod analyze;
mod config_cmd;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::load_settings;
use crate::models::OutputFormat;

/// Server address used by `analyze` when none is given.
const DEFAULT_SERVER: &str = "http://127.0.0.1:3030";

#[derive(Parser)]
#[command(name = "abapscan")]
#[command(about = "AI-assisted review of ABAP source files")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the analysis server
    Serve {
        /// Address to bind (port, host, or host:port)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Upload ABAP files to a running server and print the report
    Analyze {
        /// Files to analyze (only .abap files are sent)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Server base URL
        #[arg(short, long, env = "ABAPSCAN_SERVER", default_value = DEFAULT_SERVER)]
        server: String,
        /// Agent to run (repeatable; default: all)
        #[arg(short, long = "agent")]
        agents: Vec<String>,
        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// API key to use instead of the server's
        #[arg(long)]
        api_key: Option<String>,
        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config,

    /// List the available review agents
    Agents,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => {
            let settings = load_settings(cli.config.as_deref()).await?;
            serve::cmd_serve(settings, bind.as_deref()).await
        }
        Commands::Analyze {
            files,
            server,
            agents,
            format,
            api_key,
            output,
        } => {
            let options = analyze::AnalyzeOptions {
                server,
                agents,
                format,
                api_key,
                output,
            };
            analyze::cmd_analyze(&files, options).await
        }
        Commands::Config => {
            let settings = load_settings(cli.config.as_deref()).await?;
            config_cmd::cmd_config(&settings, cli.config.as_deref()).await
        }
        Commands::Agents => agents::cmd_agents(),
    }
}
