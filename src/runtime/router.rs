//! 自动路由：/agents/<name>/<key>[/...] → 实例
//!
//! WebSocket 升级请求进入信封中继循环；普通 HTTP 请求读出请求体后经 fetch 转发。

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use http_body_util::LengthLimitError;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::core::AgentError;
use crate::runtime::agent::AgentRequest;
use crate::runtime::envelope::{Connection, Envelope};
use crate::runtime::instance::AgentHandle;
use crate::runtime::registry::AgentRegistry;
use crate::server::ApiError;

/// 解析后的实例地址
#[derive(Debug, PartialEq, Eq)]
pub struct AgentPath<'a> {
    pub name: &'a str,
    pub key: &'a str,
    /// key 之后的剩余路径，总以 / 开头
    pub rest: String,
}

/// "research-agent/u1/history" → (research-agent, u1, /history)；缺少 key 段返回 None
pub fn parse_agent_path(path: &str) -> Option<AgentPath<'_>> {
    let mut parts = path.trim_start_matches('/').splitn(3, '/');
    let name = parts.next().filter(|s| !s.is_empty())?;
    let key = parts.next().filter(|s| !s.is_empty())?;
    let rest = format!("/{}", parts.next().unwrap_or(""));
    Some(AgentPath { name, key, rest })
}

/// 未匹配到已注册的 Agent 时返回 None，由调用方决定 404
pub async fn route_agent_request(
    registry: &AgentRegistry,
    path: &str,
    ws: Option<WebSocketUpgrade>,
    request: Request,
    body_limit: usize,
) -> Option<Response> {
    let target = parse_agent_path(path)?;
    if !registry.contains(target.name) {
        return None;
    }

    let handle = match registry.get_agent_by_name(target.name, target.key).await {
        Ok(handle) => handle,
        Err(e) => return Some(ApiError::from(e).into_response()),
    };

    if let Some(ws) = ws {
        let connection_id = format!("{}#{}", handle.id(), Uuid::new_v4());
        tracing::info!(connection = %connection_id, "websocket upgrade");
        return Some(
            ws.on_upgrade(move |socket| relay_socket(socket, handle, connection_id))
                .into_response(),
        );
    }

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, body_limit).await {
        Ok(bytes) => bytes,
        Err(e) if exceeds_limit(&e) => {
            return Some(ApiError::from(AgentError::PayloadTooLarge(body_limit)).into_response());
        }
        Err(e) => {
            let err = AgentError::MalformedPayload(format!("request body: {}", e));
            return Some(ApiError::from(err).into_response());
        }
    };

    let forwarded = AgentRequest::new(parts.method, target.rest, body);
    Some(match handle.fetch(forwarded).await {
        Ok(response) => response.into_response(),
        Err(e) => ApiError::from(e).into_response(),
    })
}

/// 读取请求体失败是否因为超出长度上限
fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source = Some(err as &(dyn std::error::Error + 'static));
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

/// 帧按到达顺序投递到实例邮箱；写任务把信封按发送顺序写回
async fn relay_socket(socket: WebSocket, handle: AgentHandle, connection_id: String) {
    let (mut sink, mut source) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();
    let connection = Connection::new(connection_id.clone(), tx);

    let writer = tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            let text = match serde_json::to_string(&envelope) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("envelope serialization failed: {}", e);
                    continue;
                }
            };
            if sink.send(WsMessage::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = source.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => {
                if let Err(e) = handle.deliver(connection.clone(), text).await {
                    connection.send(Envelope::error(e.to_string()));
                    break;
                }
            }
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(connection = %connection_id, "websocket read error: {}", e);
                break;
            }
        }
    }

    // 写任务在所有 Connection 克隆（含邮箱中待处理的）释放后退出
    drop(connection);
    let _ = writer.await;
    tracing::info!(connection = %connection_id, "websocket closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_agent_path() {
        assert_eq!(
            parse_agent_path("research-agent/u1"),
            Some(AgentPath {
                name: "research-agent",
                key: "u1",
                rest: "/".to_string()
            })
        );
        let p = parse_agent_path("/research-agent/u1/history/today").unwrap();
        assert_eq!(p.key, "u1");
        assert_eq!(p.rest, "/history/today");
    }

    #[test]
    fn test_parse_agent_path_requires_key() {
        assert!(parse_agent_path("research-agent").is_none());
        assert!(parse_agent_path("research-agent/").is_none());
        assert!(parse_agent_path("").is_none());
    }
}
