use std::sync::{Arc, Mutex};

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::{Value, json};
use stackhook_core::{InlineLink, Notifier, NotifyError};
use stackhook_telegram::TelegramNotifier;

type Received = Arc<Mutex<Vec<Value>>>;

/// Serve a Bot API double that answers every `sendMessage` with `status` + `reply`.
async fn spawn_api(status: StatusCode, reply: Value) -> (String, Received) {
    let received: Received = Arc::default();

    let app = Router::new()
        .route(
            "/bottest-token/sendMessage",
            post(
                move |State(received): State<Received>, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        received.lock().unwrap().push(body);
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), received)
}

#[tokio::test]
async fn sends_message_with_button() {
    let (base, received) = spawn_api(StatusCode::OK, json!({"ok": true, "result": {}})).await;
    let notifier = TelegramNotifier::new("test-token", "-100200").with_api_base(base);

    let link = InlineLink::new("Deploy", "https://d.example/deploy/tok/abc123");
    notifier
        .send_message("🚨 Commit pushed\\.", Some(&link))
        .await
        .unwrap();

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["chat_id"], "-100200");
    assert_eq!(received[0]["parse_mode"], "MarkdownV2");
    assert_eq!(
        received[0]["reply_markup"]["inline_keyboard"][0][0]["url"],
        "https://d.example/deploy/tok/abc123"
    );
}

#[tokio::test]
async fn api_rejection_is_reported() {
    let (base, _) = spawn_api(
        StatusCode::BAD_REQUEST,
        json!({"ok": false, "description": "Bad Request: can't parse entities"}),
    )
    .await;
    let notifier = TelegramNotifier::new("test-token", "1").with_api_base(base);

    let err = notifier.send_message("unescaped.", None).await.unwrap_err();

    match err {
        NotifyError::Rejected {
            status,
            description,
        } => {
            assert_eq!(status, 400);
            assert!(description.contains("can't parse entities"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_api_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let notifier = TelegramNotifier::new("test-token", "1").with_api_base(format!("http://{addr}"));
    let err = notifier.send_message("hi", None).await.unwrap_err();

    assert!(matches!(err, NotifyError::Transport(_)));
    assert!(!err.to_string().contains("test-token"));
}
