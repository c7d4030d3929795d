//! Agent 能力接口与请求/响应类型
//!
//! 一个 Agent 实例可以响应三种输入：通用 HTTP 请求（on_request）、WebSocket 文本帧（on_message）、
//! 具名 RPC 方法（call）。所有方法都在实例自己的任务里串行执行。

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::stream;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::core::AgentError;
use crate::llm::TokenStream;
use crate::runtime::envelope::{Connection, Envelope};
use crate::runtime::rpc::{RpcCall, RpcMethod};

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";

/// 转发给实例的 HTTP 请求（路径为 key 之后的剩余部分）
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub method: Method,
    pub path: String,
    pub body: Bytes,
}

impl AgentRequest {
    pub fn new(method: Method, path: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            path: path.into(),
            body: body.into(),
        }
    }

    /// 以 JSON 体构造 POST 请求
    pub fn post_json(path: impl Into<String>, body: &serde_json::Value) -> Self {
        Self::new(Method::POST, path, body.to_string())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AgentError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// 完整缓冲的文本响应；RPC 方法只能返回它
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl TextResponse {
    pub fn plain(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: TEXT_PLAIN,
            body: body.into(),
        }
    }

    pub fn json(value: &serde_json::Value) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: APPLICATION_JSON,
            body: value.to_string(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl IntoResponse for TextResponse {
    fn into_response(self) -> Response {
        (self.status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// on_request 在实例内部的产出
pub enum Reply {
    Text(TextResponse),
    /// 模型 Token 流，由实例任务负责泵出
    Stream(TokenStream),
}

pub enum AgentBody {
    Full(String),
    Channel(mpsc::Receiver<Result<Bytes, AgentError>>),
}

/// 跨越实例边界的响应；流式内容只以字节通道的形式出现
pub struct AgentResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: AgentBody,
}

impl AgentResponse {
    pub fn streaming(rx: mpsc::Receiver<Result<Bytes, AgentError>>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: TEXT_PLAIN,
            body: AgentBody::Channel(rx),
        }
    }

    /// 读完整个响应体（测试与缓冲场景）
    pub async fn text(self) -> Result<String, AgentError> {
        match self.body {
            AgentBody::Full(body) => Ok(body),
            AgentBody::Channel(mut rx) => {
                let mut out = Vec::new();
                while let Some(chunk) = rx.recv().await {
                    out.extend_from_slice(&chunk?);
                }
                String::from_utf8(out).map_err(|e| AgentError::MalformedPayload(e.to_string()))
            }
        }
    }
}

impl From<TextResponse> for AgentResponse {
    fn from(text: TextResponse) -> Self {
        Self {
            status: text.status,
            content_type: text.content_type,
            body: AgentBody::Full(text.body),
        }
    }
}

impl IntoResponse for AgentResponse {
    fn into_response(self) -> Response {
        let body = match self.body {
            AgentBody::Full(text) => Body::from(text),
            AgentBody::Channel(rx) => Body::from_stream(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|chunk| (chunk, rx))
            })),
        };
        (self.status, [(header::CONTENT_TYPE, self.content_type)], body).into_response()
    }
}

/// Agent 容器类需实现的能力接口
#[async_trait]
pub trait Agent: Send + 'static {
    /// 通用 HTTP 入口
    async fn on_request(&mut self, request: AgentRequest) -> Result<Reply, AgentError> {
        tracing::debug!(method = %request.method, path = %request.path, "no HTTP handler");
        Ok(Reply::Text(
            TextResponse::plain("Not found").with_status(StatusCode::NOT_FOUND),
        ))
    }

    /// WebSocket 文本帧
    async fn on_message(&mut self, connection: &Connection, _raw: &str) {
        connection.send(Envelope::error("This agent does not accept messages"));
    }

    /// 可调用的 RPC 方法；不在列表中的调用在进入 call 之前就被拒绝
    fn methods(&self) -> &'static [RpcMethod] {
        &[]
    }

    async fn call(&mut self, call: RpcCall) -> Result<TextResponse, AgentError> {
        Err(AgentError::MethodNotFound(call.method().to_string()))
    }

    /// on_request 返回的流被完整泵出后调用
    fn on_reply_complete(&mut self, _full: &str) {}
}
