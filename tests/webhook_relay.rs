use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use report_relay::relay::{Relay, RelayError, WebhookRelay};
use reqwest::Url;
use serde_json::Value;
use tokio::{net::TcpListener, sync::Mutex};

type Received = Arc<Mutex<Vec<Value>>>;

/// 在本地随机端口启动一个假 webhook，返回其地址和收到的请求体
async fn spawn_webhook(status: StatusCode, reply: &'static str) -> (Url, Received) {
    let received: Received = Arc::default();

    let app = Router::new()
        .route(
            "/hook",
            post(
                move |State(received): State<Received>, Json(body): Json<Value>| async move {
                    received.lock().await.push(body);
                    (status, reply)
                },
            ),
        )
        .with_state(received.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (Url::parse(&format!("http://{}/hook", addr)).unwrap(), received)
}

#[tokio::test]
async fn posts_text_as_json() {
    let (url, received) = spawn_webhook(StatusCode::OK, "ok").await;
    let relay = WebhookRelay::new(Some(url));

    relay.forward("daily report: all green").await.unwrap();

    let received = received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0], serde_json::json!({ "text": "daily report: all green" }));
}

#[tokio::test]
async fn rejection_carries_destination_detail() {
    let (url, _) = spawn_webhook(StatusCode::FORBIDDEN, "invalid_token").await;
    let relay = WebhookRelay::new(Some(url));

    match relay.forward("hello").await {
        Err(RelayError::Rejected { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "invalid_token");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_destination_is_a_transport_error() {
    // 先占用再释放端口，确保没有服务在监听
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let relay = WebhookRelay::new(Some(Url::parse(&format!("http://{}/hook", addr)).unwrap()));
    assert!(matches!(
        relay.forward("hello").await,
        Err(RelayError::Transport(_))
    ));
}

#[tokio::test]
async fn missing_destination_is_reported() {
    let relay = WebhookRelay::new(None);
    assert!(matches!(
        relay.forward("hello").await,
        Err(RelayError::NotConfigured)
    ));
}
