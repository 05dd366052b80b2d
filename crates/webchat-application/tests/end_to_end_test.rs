mod common;

use std::sync::Arc;

use common::RecordingView;
use pretty_assertions::assert_eq;
use serde_json::json;
use webchat_application::{RestoreOutcome, TurnOutcome, WidgetController};
use webchat_core::config::WidgetConfig;
use webchat_core::session::Sender;
use webchat_infrastructure::WebchatPaths;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> WidgetConfig {
    WidgetConfig::from_json(&format!(
        r#"{{
            "webhookUrl": "{}/webhook/chat",
            "metadata": {{"source": "test-suite"}}
        }}"#,
        server.uri()
    ))
    .unwrap()
}

#[tokio::test]
async fn test_conversation_survives_restart_with_file_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .and(body_partial_json(json!({
            "action": "question",
            "chatInput": "I have a question",
            "source": "test-suite"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"output": "Sure, ask away."}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();

    let view = Arc::new(RecordingView::new());
    let widget = WidgetController::builder(config_for(&server))
        .view(view.clone())
        .data_dir(data_dir.path())
        .build()
        .unwrap();
    assert_eq!(widget.mount().await.unwrap(), Some(RestoreOutcome::Fresh));

    let outcome = widget
        .click_action("I have a question", "question")
        .await
        .unwrap();
    assert_eq!(outcome, TurnOutcome::Replied("Sure, ask away.".to_string()));
    assert!(WebchatPaths::store_file_in(data_dir.path()).exists());
    drop(widget);

    let view = Arc::new(RecordingView::new());
    let restarted = WidgetController::builder(config_for(&server))
        .view(view.clone())
        .data_dir(data_dir.path())
        .build()
        .unwrap();

    assert_eq!(
        restarted.mount().await.unwrap(),
        Some(RestoreOutcome::Restored(2))
    );
    assert_eq!(
        view.visible_messages(),
        vec![
            (Sender::User, "I have a question".to_string()),
            (Sender::Bot, "Sure, ask away.".to_string())
        ]
    );
}

#[tokio::test]
async fn test_unsafe_webhook_url_is_treated_as_missing() {
    let config = WidgetConfig {
        webhook_url: Some("javascript:alert(1)".to_string()),
        use_session_storage: true,
        ..WidgetConfig::default()
    };
    let view = Arc::new(RecordingView::new());
    let widget = WidgetController::builder(config)
        .view(view.clone())
        .build()
        .unwrap();
    widget.mount().await.unwrap();

    assert_eq!(widget.config().webhook_url, None);
    assert_eq!(widget.submit("Hi").await.unwrap(), TurnOutcome::NotConfigured);
}
