//! Agent 实例 Actor
//!
//! 每个 (agent, key) 一个 tokio 任务，独占 Box<dyn Agent>，通过有界邮箱接收命令，
//! 严格按到达顺序逐条处理。流式回复在实例任务内部泵入字节通道，调用方只拿到通道的接收端。
//! 接收端停止读取超过 stall_timeout 时放弃该流，实例继续处理后续命令。

use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use crate::core::AgentError;
use crate::llm::TokenStream;
use crate::runtime::agent::{Agent, AgentRequest, AgentResponse, Reply, TextResponse};
use crate::runtime::envelope::Connection;
use crate::runtime::rpc::RpcCall;

/// 流式响应字节通道容量
const STREAM_BUFFER: usize = 16;

enum Command {
    Request {
        request: AgentRequest,
        reply: oneshot::Sender<Result<AgentResponse, AgentError>>,
    },
    Message {
        connection: Connection,
        raw: String,
    },
    Rpc {
        call: RpcCall,
        reply: oneshot::Sender<Result<TextResponse, AgentError>>,
    },
}

/// 实例句柄（可克隆，克隆体共享同一邮箱）
#[derive(Clone)]
pub struct AgentHandle {
    id: String,
    tx: mpsc::Sender<Command>,
}

impl AgentHandle {
    pub fn spawn(
        id: impl Into<String>,
        agent: Box<dyn Agent>,
        mailbox_capacity: usize,
        stall_timeout: Duration,
    ) -> Self {
        let id = id.into();
        let (tx, rx) = mpsc::channel(mailbox_capacity.max(1));
        tokio::spawn(run_instance(id.clone(), agent, rx, stall_timeout));
        Self { id, tx }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 实例任务已退出
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn unavailable(&self) -> AgentError {
        AgentError::Unavailable(self.id.clone())
    }

    async fn send(&self, command: Command) -> Result<(), AgentError> {
        self.tx.send(command).await.map_err(|_| self.unavailable())
    }

    /// 通用 HTTP 入口
    pub async fn fetch(&self, request: AgentRequest) -> Result<AgentResponse, AgentError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Request { request, reply }).await?;
        rx.await.map_err(|_| self.unavailable())?
    }

    /// 具名方法调用，返回完整缓冲的文本
    pub async fn call(&self, call: RpcCall) -> Result<TextResponse, AgentError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Rpc { call, reply }).await?;
        rx.await.map_err(|_| self.unavailable())?
    }

    /// 投递一条 WebSocket 文本帧；回复经 connection 以信封形式写回
    pub async fn deliver(&self, connection: Connection, raw: String) -> Result<(), AgentError> {
        self.send(Command::Message { connection, raw }).await
    }
}

async fn run_instance(
    id: String,
    mut agent: Box<dyn Agent>,
    mut rx: mpsc::Receiver<Command>,
    stall_timeout: Duration,
) {
    tracing::info!(instance = %id, "agent instance started");

    while let Some(command) = rx.recv().await {
        match command {
            Command::Request { request, reply } => match agent.on_request(request).await {
                Ok(Reply::Text(text)) => {
                    let _ = reply.send(Ok(text.into()));
                }
                Ok(Reply::Stream(tokens)) => {
                    let (body_tx, body_rx) = mpsc::channel(STREAM_BUFFER);
                    if reply.send(Ok(AgentResponse::streaming(body_rx))).is_err() {
                        tracing::debug!(instance = %id, "caller gone before stream started");
                        continue;
                    }
                    if let Some(full) = pump(&id, tokens, body_tx, stall_timeout).await {
                        agent.on_reply_complete(&full);
                    }
                }
                Err(e) => {
                    let _ = reply.send(Err(e));
                }
            },
            Command::Message { connection, raw } => {
                agent.on_message(&connection, &raw).await;
            }
            Command::Rpc { call, reply } => {
                let method = call.method();
                let result = if agent.methods().contains(&method) {
                    agent.call(call).await
                } else {
                    Err(AgentError::MethodNotFound(method.to_string()))
                };
                let _ = reply.send(result);
            }
        }
    }

    tracing::info!(instance = %id, "agent instance stopped");
}

/// 把 Token 流写入字节通道；接收端关闭（客户端断开）或停止读取即停止。成功时返回完整文本。
async fn pump(
    id: &str,
    mut tokens: TokenStream,
    body: mpsc::Sender<Result<Bytes, AgentError>>,
    stall_timeout: Duration,
) -> Option<String> {
    let mut full = String::new();
    while let Some(item) = tokens.next().await {
        match item {
            Ok(token) => {
                full.push_str(&token);
                match timeout(stall_timeout, body.send(Ok(Bytes::from(token)))).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => {
                        tracing::debug!(instance = %id, "client disconnected, stream abandoned");
                        return None;
                    }
                    Err(_) => {
                        tracing::warn!(instance = %id, "client stopped reading, stream abandoned");
                        return None;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(instance = %id, "stream failed: {}", e);
                let _ = timeout(stall_timeout, body.send(Err(e.into()))).await;
                return None;
            }
        }
    }
    Some(full)
}
