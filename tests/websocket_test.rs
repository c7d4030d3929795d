//! 真实监听端口上的 WebSocket 中继与客户端测试

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use hive::client::{ClientError, HiveClient};
use hive::llm::MockLlmClient;
use hive::runtime::Envelope;
use hive::{build_app, AppConfig};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

async fn spawn_server() -> HiveClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_app(&AppConfig::default(), Arc::new(MockLlmClient));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    HiveClient::new(format!("http://{}", addr))
}

type Socket = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn next_envelope(socket: &mut Socket) -> Envelope {
    loop {
        match socket.next().await.unwrap().unwrap() {
            WsMessage::Text(text) => return serde_json::from_str(&text).unwrap(),
            _ => continue,
        }
    }
}

/// 读到 complete / error 为止
async fn read_reply(socket: &mut Socket) -> Vec<Envelope> {
    let mut out = Vec::new();
    loop {
        let envelope = next_envelope(socket).await;
        let done = envelope.is_terminal();
        out.push(envelope);
        if done {
            return out;
        }
    }
}

fn chunk_text(envelopes: &[Envelope]) -> String {
    envelopes
        .iter()
        .filter_map(|e| match e {
            Envelope::Chunk { content } => Some(content.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_chat_ws_renders_chunks_until_complete() {
    let client = spawn_server().await;
    let mut chunks = Vec::new();
    let full = client
        .chat_ws("research-agent", "ws-u1", "Plan a trip to Tokyo", |c| {
            chunks.push(c.to_string())
        })
        .await
        .unwrap();
    assert_eq!(full, "Mock reply to: Plan a trip to Tokyo");
    assert!(chunks.len() > 1);
}

#[tokio::test]
async fn test_malformed_frame_gets_exactly_one_error() {
    let client = spawn_server().await;
    let (mut socket, _) = connect_async(client.ws_url("research-agent", "ws-u2"))
        .await
        .unwrap();

    socket.send(WsMessage::Text("not json".to_string())).await.unwrap();
    let reply = read_reply(&mut socket).await;
    assert_eq!(reply.len(), 1);
    assert!(matches!(reply[0], Envelope::Error { .. }));

    // 连接仍可用，下一条消息正常完成
    socket
        .send(WsMessage::Text(json!({"prompt": "hi"}).to_string()))
        .await
        .unwrap();
    let reply = read_reply(&mut socket).await;
    assert_eq!(reply.last(), Some(&Envelope::Complete));
    assert_eq!(chunk_text(&reply), "Mock reply to: hi");
}

#[tokio::test]
async fn test_overlapping_messages_are_serialized() {
    let client = spawn_server().await;
    let (mut socket, _) = connect_async(client.ws_url("research-agent", "ws-u3"))
        .await
        .unwrap();

    for prompt in ["first question", "second question"] {
        socket
            .send(WsMessage::Text(json!({ "prompt": prompt }).to_string()))
            .await
            .unwrap();
    }

    let first = read_reply(&mut socket).await;
    let second = read_reply(&mut socket).await;
    assert_eq!(chunk_text(&first), "Mock reply to: first question");
    assert_eq!(chunk_text(&second), "Mock reply to: second question");
    assert_eq!(first.iter().filter(|e| e.is_terminal()).count(), 1);
    assert_eq!(second.iter().filter(|e| e.is_terminal()).count(), 1);
}

#[tokio::test]
async fn test_error_envelope_surfaces_as_client_error() {
    let client = spawn_server().await;
    let err = client
        .chat_ws("research-agent", "ws-u4", "   ", |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Agent(msg) if msg == "Prompt is required"));
}

#[tokio::test]
async fn test_unknown_agent_rejects_upgrade() {
    let client = spawn_server().await;
    assert!(connect_async(client.ws_url("unknown", "x")).await.is_err());
}

#[tokio::test]
async fn test_http_stream_and_rpc_over_socket() {
    let client = spawn_server().await;

    let mut pieces = 0;
    let full = client
        .stream_text(
            "/api/research",
            &json!({"prompt": "Compare Kyoto and Osaka", "userId": "http-u1"}),
            |_| pieces += 1,
        )
        .await
        .unwrap();
    assert_eq!(full, "Mock reply to: Compare Kyoto and Osaka");
    assert!(pieces >= 1);

    let text = client
        .post_text("/api/recipe", &json!({"cuisine": "Mexican"}))
        .await
        .unwrap();
    assert!(text.contains("Mexican dish"));

    let err = client
        .post_text("/agents/unknown/x", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 404, .. }));
}
