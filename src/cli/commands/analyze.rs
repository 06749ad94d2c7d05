//! Analyze command: upload files to a running server.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use console::style;

use crate::cli::helpers::{arrow, expand_path, failure, read_upload, render_result, success};
use crate::client::{AnalysisController, AnalysisState, RelayClient, EXTENSION_MESSAGE};
use crate::models::{find_agent, OutputFormat};

pub struct AnalyzeOptions {
    pub server: String,
    pub agents: Vec<String>,
    pub format: OutputFormat,
    pub api_key: Option<String>,
    pub output: Option<PathBuf>,
}

pub async fn cmd_analyze(paths: &[PathBuf], options: AnalyzeOptions) -> anyhow::Result<()> {
    let mut selected = BTreeSet::new();
    for id in &options.agents {
        let agent =
            find_agent(id).ok_or_else(|| anyhow::anyhow!("Unknown agent '{}'", id))?;
        selected.insert(agent.id);
    }

    let mut controller = AnalysisController::new(RelayClient::new(options.server.as_str()));
    controller.load_config().await;
    if let Some(warning) = controller.config_warning() {
        eprintln!("{} {}", style("!").yellow(), warning);
    }

    if let Some(key) = options.api_key {
        controller.set_api_key(key);
    }
    controller.set_output_format(options.format);
    for id in selected {
        controller.toggle_agent(id);
    }

    let uploads = paths
        .iter()
        .map(|p| read_upload(p))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let offered = uploads.len();
    let accepted = controller.add_files(uploads);
    if accepted == 0 {
        let message = controller
            .notice()
            .unwrap_or(EXTENSION_MESSAGE)
            .to_string();
        eprintln!("{} {}", failure(), message);
        anyhow::bail!(message)
    }
    if accepted < offered {
        eprintln!(
            "{} Skipped {} non-ABAP file(s)",
            style("!").yellow(),
            offered - accepted
        );
    }

    eprintln!(
        "{} Analyzing {} file(s) via {}",
        arrow(),
        controller.files().len(),
        controller.transport().base_url()
    );

    let state = controller.submit().await.clone();
    match state {
        AnalysisState::Success(result) => {
            let rendered = render_result(&result)?;
            match options.output {
                Some(path) => write_report(&path, &rendered)?,
                None => print!("{}", rendered),
            }
            Ok(())
        }
        AnalysisState::Error(message) => {
            eprintln!("{} {}", failure(), message);
            anyhow::bail!(message)
        }
        AnalysisState::Idle | AnalysisState::Analyzing => {
            let message = controller
                .notice()
                .unwrap_or("Analysis was not started")
                .to_string();
            eprintln!("{} {}", failure(), message);
            anyhow::bail!(message)
        }
    }
}

fn write_report(path: &Path, content: &str) -> anyhow::Result<()> {
    let path = expand_path(path);
    std::fs::write(&path, content)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
    eprintln!("{} Report written to {}", success(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn options(server: String) -> AnalyzeOptions {
        AnalyzeOptions {
            server,
            agents: Vec::new(),
            format: OutputFormat::Json,
            api_key: Some("sk-test".to_string()),
            output: None,
        }
    }

    fn unused_server() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_only_non_abap_paths_reports_extension_error() {
        let dir = tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "hello").unwrap();

        let err = cmd_analyze(&[notes], options(unused_server()))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), EXTENSION_MESSAGE);
    }

    #[tokio::test]
    async fn test_unknown_agent_is_rejected() {
        let mut opts = options(unused_server());
        opts.agents = vec!["style".to_string()];

        let err = cmd_analyze(&[PathBuf::from("Z1.abap")], opts)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Unknown agent 'style'"));
    }
}
