//! 前端适配器的 Rust 版本
//!
//! - stream_text：POST 后增量读取流式响应体（对应 HTTP 转发路径）
//! - post_text：POST 后读取完整响应（对应 RPC 路径）
//! - chat_ws：连接 /agents/<agent>/<key>，发送 {prompt}，渲染 chunk 直到 complete / error

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use thiserror::Error;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::runtime::Envelope;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// 服务端发来的 error 信封
    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Invalid envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("Connection closed before completion")]
    Closed,
}

#[derive(Clone)]
pub struct HiveClient {
    base_url: String,
    http: reqwest::Client,
}

impl HiveClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// http(s):// → ws(s)://
    pub fn ws_url(&self, agent: &str, key: &str) -> String {
        let base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.base_url.clone()
        };
        format!("{}/agents/{}/{}", base, agent, key)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<reqwest::Response, ClientError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// 流式读取响应体，每收到一段完整 UTF-8 文本回调一次；返回完整文本
    pub async fn stream_text<F>(&self, path: &str, body: &Value, mut on_chunk: F) -> Result<String, ClientError>
    where
        F: FnMut(&str),
    {
        let mut bytes_stream = self.post(path, body).await?.bytes_stream();
        let mut pending: Vec<u8> = Vec::new();
        let mut full = String::new();

        while let Some(chunk) = bytes_stream.next().await {
            pending.extend_from_slice(&chunk?);
            // 多字节字符可能被切在两段之间，只取合法前缀
            let valid = match std::str::from_utf8(&pending) {
                Ok(text) => text.len(),
                Err(e) => e.valid_up_to(),
            };
            if valid == 0 {
                continue;
            }
            let text = String::from_utf8_lossy(&pending[..valid]).into_owned();
            pending.drain(..valid);
            on_chunk(&text);
            full.push_str(&text);
        }

        if !pending.is_empty() {
            let rest = String::from_utf8_lossy(&pending).into_owned();
            on_chunk(&rest);
            full.push_str(&rest);
        }
        Ok(full)
    }

    /// 读取完整响应文本（RPC 路由）
    pub async fn post_text(&self, path: &str, body: &Value) -> Result<String, ClientError> {
        Ok(self.post(path, body).await?.text().await?)
    }

    /// 发送一条 prompt，渲染 chunk 直到 complete；error 信封转为 ClientError::Agent
    pub async fn chat_ws<F>(&self, agent: &str, key: &str, prompt: &str, mut on_chunk: F) -> Result<String, ClientError>
    where
        F: FnMut(&str),
    {
        let (mut socket, _) = connect_async(self.ws_url(agent, key)).await?;
        socket
            .send(WsMessage::Text(json!({ "prompt": prompt }).to_string()))
            .await?;

        let mut full = String::new();
        while let Some(frame) = socket.next().await {
            let text = match frame? {
                WsMessage::Text(text) => text,
                WsMessage::Close(_) => break,
                _ => continue,
            };
            match serde_json::from_str::<Envelope>(&text)? {
                Envelope::Chunk { content } => {
                    on_chunk(&content);
                    full.push_str(&content);
                }
                Envelope::Complete => {
                    let _ = socket.close(None).await;
                    return Ok(full);
                }
                Envelope::Error { message } => {
                    let _ = socket.close(None).await;
                    return Err(ClientError::Agent(message));
                }
            }
        }
        Err(ClientError::Closed)
    }
}
