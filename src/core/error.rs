//! Agent 错误类型
//!
//! 分发层把 AgentError 映射为 HTTP 状态码（见 server::ApiError）；WebSocket 路径则转成 error 信封。

use thiserror::Error;

use crate::llm::LlmError;

/// Agent 运行过程中可能出现的错误（路由、载荷、模型、工具、实例生命周期）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Instance key must not be empty")]
    InvalidKey,

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// 请求体 / WebSocket 帧无法解析
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Prompt is required")]
    EmptyPrompt,

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// 模型输出了看起来像工具调用但无法解析的 JSON
    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    #[error("Hallucinated tool: {0}")]
    HallucinatedTool(String),

    #[error("Reasoning step limit reached ({0} steps)")]
    StepLimitExceeded(usize),

    /// 结构化输出不符合 Schema
    #[error("Structured output invalid: {0}")]
    StructuredOutput(String),

    /// 实例任务已退出（邮箱关闭或回复通道被丢弃）
    #[error("Agent instance unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for AgentError {
    fn from(e: serde_json::Error) -> Self {
        AgentError::MalformedPayload(e.to_string())
    }
}
