//! End-to-end: client controller -> relay server -> mocked provider.

use abapscan::client::{AnalysisController, AnalysisState, RelayClient};
use abapscan::config::{ProviderConfig, Settings};
use abapscan::models::{OutputFormat, UploadedFile};
use abapscan::server::{create_router, AppState};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn spawn_server(settings: Settings) -> String {
    let state = AppState::new(settings).unwrap();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn settings_for(provider: &MockServer, api_key: &str) -> Settings {
    Settings {
        provider: ProviderConfig {
            api_key: api_key.to_string(),
            api_provider: "anthropic".to_string(),
            model_name: "claude-test".to_string(),
            api_base_url: provider.uri(),
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_upload_flows_through_to_provider() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-server"))
        .and(body_string_contains("ZFLOW.abap"))
        .and(body_string_contains("SELECT * FROM mara"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "claude-test",
            "content": [{
                "type": "text",
                "text": "```json\n{\"summary\": \"One issue\", \"findings\": [{\"agent\": \"performance\", \"severity\": \"medium\", \"file\": \"ZFLOW.abap\", \"line\": 2, \"title\": \"SELECT *\", \"detail\": \"Select only needed fields\"}]}\n```"
            }],
            "usage": {"input_tokens": 120, "output_tokens": 40}
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let base = spawn_server(settings_for(&provider, "sk-server")).await;

    let mut controller = AnalysisController::new(RelayClient::new(base));
    controller.load_config().await;
    assert_eq!(controller.config_warning(), None);
    assert_eq!(controller.settings().api_key, "sk-server");

    controller.toggle_agent("performance");
    controller.add_files([
        UploadedFile::new("ZFLOW.abap", "REPORT zflow.\nSELECT * FROM mara INTO TABLE @DATA(lt)."),
        UploadedFile::new("README.md", "ignored"),
    ]);

    match controller.submit().await {
        AnalysisState::Success(result) => {
            assert_eq!(result["provider"], "anthropic");
            assert_eq!(result["model"], "claude-test");
            assert_eq!(result["agents"], serde_json::json!(["performance"]));
            assert_eq!(result["files"][0]["name"], "ZFLOW.abap");
            assert_eq!(result["report"]["summary"], "One issue");
            assert_eq!(result["report"]["findings"][0]["line"], 2);
            assert_eq!(result["usage"]["inputTokens"], 120);
        }
        other => panic!("unexpected state: {other:?}"),
    }
}

#[tokio::test]
async fn test_provider_failure_reaches_client_as_error() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })))
        .mount(&provider)
        .await;

    let base = spawn_server(settings_for(&provider, "sk-bad")).await;

    let mut controller = AnalysisController::new(RelayClient::new(base));
    controller.load_config().await;
    controller.set_output_format(OutputFormat::Markdown);
    controller.add_files([UploadedFile::new("Z1.abap", "REPORT z1.")]);

    match controller.submit().await {
        AnalysisState::Error(message) => {
            assert!(message.starts_with("Analysis failed: "));
            assert!(message.contains("502"));
            assert!(message.contains("invalid x-api-key"));
        }
        other => panic!("unexpected state: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_key_blocks_submit_locally() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&provider)
        .await;

    let base = spawn_server(settings_for(&provider, "")).await;

    let mut controller = AnalysisController::new(RelayClient::new(base));
    controller.load_config().await;
    controller.add_files([UploadedFile::new("Z1.abap", "REPORT z1.")]);
    controller.submit().await;

    assert_eq!(controller.state(), &AnalysisState::Idle);
    assert_eq!(controller.notice(), Some("API key missing"));
}
