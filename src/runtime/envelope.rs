//! WebSocket 信封协议与连接句柄
//!
//! 只有三种信封：chunk / complete / error。一次成功的生成是「若干 chunk + 一个 complete」，
//! 失败则只有一个 error，之后不再发送任何信封。

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::llm::TokenStream;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
    Chunk { content: String },
    Complete,
    Error { message: String },
}

impl Envelope {
    pub fn chunk(content: impl Into<String>) -> Self {
        Envelope::Chunk {
            content: content.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error {
            message: message.into(),
        }
    }

    /// complete / error 之后本次回复结束
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Envelope::Chunk { .. })
    }
}

/// 单个 WebSocket 对端；写任务负责把信封序列化成 Text 帧
#[derive(Debug, Clone)]
pub struct Connection {
    id: String,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl Connection {
    pub fn new(id: impl Into<String>, tx: mpsc::UnboundedSender<Envelope>) -> Self {
        Self { id: id.into(), tx }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 对端已断开时静默丢弃
    pub fn send(&self, envelope: Envelope) {
        if self.tx.send(envelope).is_err() {
            tracing::debug!(connection = %self.id, "connection closed, envelope dropped");
        }
    }
}

/// 把 Token 流转成信封：每个 token 一个 chunk，结束发 complete；
/// 出错只发一个 error。成功时返回完整文本。
pub async fn relay_stream(connection: &Connection, mut tokens: TokenStream) -> Option<String> {
    let mut full = String::new();
    while let Some(item) = tokens.next().await {
        match item {
            Ok(token) => {
                if token.is_empty() {
                    continue;
                }
                full.push_str(&token);
                connection.send(Envelope::chunk(token));
            }
            Err(e) => {
                tracing::warn!(connection = %connection.id(), "stream failed: {}", e);
                connection.send(Envelope::error(e.to_string()));
                return None;
            }
        }
    }
    connection.send(Envelope::Complete);
    Some(full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use futures_util::stream;

    fn drain(rx: &mut mpsc::UnboundedReceiver<Envelope>) -> Vec<Envelope> {
        let mut out = Vec::new();
        while let Ok(e) = rx.try_recv() {
            out.push(e);
        }
        out
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(
            serde_json::to_string(&Envelope::chunk("hi")).unwrap(),
            r#"{"type":"chunk","content":"hi"}"#
        );
        assert_eq!(
            serde_json::to_string(&Envelope::Complete).unwrap(),
            r#"{"type":"complete"}"#
        );
        assert_eq!(
            serde_json::to_string(&Envelope::error("bad")).unwrap(),
            r#"{"type":"error","message":"bad"}"#
        );
    }

    #[tokio::test]
    async fn test_relay_success_ends_with_single_complete() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let conn = Connection::new("c1", tx);
        let tokens: TokenStream = Box::pin(stream::iter(vec![
            Ok("Hello ".to_string()),
            Ok(String::new()),
            Ok("world".to_string()),
        ]));

        let full = relay_stream(&conn, tokens).await;
        assert_eq!(full.as_deref(), Some("Hello world"));
        assert_eq!(
            drain(&mut rx),
            vec![Envelope::chunk("Hello "), Envelope::chunk("world"), Envelope::Complete]
        );
    }

    #[tokio::test]
    async fn test_relay_error_is_last_envelope() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let conn = Connection::new("c2", tx);
        let tokens: TokenStream = Box::pin(stream::iter(vec![
            Ok("partial".to_string()),
            Err(LlmError::Stream("reset".to_string())),
            Ok("never".to_string()),
        ]));

        assert!(relay_stream(&conn, tokens).await.is_none());
        let sent = drain(&mut rx);
        assert_eq!(sent.len(), 2);
        assert!(matches!(&sent[1], Envelope::Error { message } if message.contains("reset")));
        assert_eq!(sent.iter().filter(|e| e.is_terminal()).count(), 1);
    }

    #[test]
    fn test_send_to_closed_connection_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        Connection::new("gone", tx).send(Envelope::Complete);
    }
}
