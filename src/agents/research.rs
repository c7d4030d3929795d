//! ResearchAgent（research-agent）
//!
//! 带城市工具的旅行研究助手，每个实例保留自己的对话历史。
//! - HTTP POST {prompt} → 流式纯文本；GET → 历史 JSON
//! - WebSocket {prompt} → chunk* + complete（或单个 error）
//! - RPC initiate_agent(prompt) → 在方法内缓冲成完整文本

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use futures_util::TryStreamExt;
use serde_json::json;

use crate::agents::{parse_prompt, PromptBody};
use crate::core::AgentError;
use crate::memory::ConversationHistory;
use crate::orchestration::Orchestrator;
use crate::prompts::research_system_prompt;
use crate::runtime::{
    relay_stream, Agent, AgentContext, AgentRequest, Connection, Envelope, Reply, RpcCall,
    RpcMethod, TextResponse,
};
use crate::tools::{tool_call_schema_json, CityDistanceTool, CityLookupTool, ToolExecutor, ToolRegistry};

pub struct ResearchAgent {
    key: String,
    orchestrator: Orchestrator,
    history: ConversationHistory,
    /// 正在流式输出的那次 HTTP 请求的 prompt，流结束后写入历史
    pending_prompt: Option<String>,
}

impl ResearchAgent {
    pub const CLASS_NAME: &'static str = "ResearchAgent";

    pub fn new(ctx: AgentContext) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(CityLookupTool);
        tools.register(CityDistanceTool);

        let system_prompt = research_system_prompt(&tools.to_schema_json(), &tool_call_schema_json());
        let orchestrator = Orchestrator::new(ctx.llm, system_prompt)
            .with_settings(&ctx.settings)
            .with_tools(ToolExecutor::new(tools, ctx.settings.tool_timeout_secs));

        Self {
            key: ctx.key,
            orchestrator,
            history: ConversationHistory::new(ctx.settings.history_turns),
            pending_prompt: None,
        }
    }

    fn history_json(&self) -> TextResponse {
        TextResponse::json(&json!({
            "key": self.key,
            "turns": self.history.turns(),
            "messages": self.history.messages(),
        }))
    }
}

#[async_trait]
impl Agent for ResearchAgent {
    async fn on_request(&mut self, request: AgentRequest) -> Result<Reply, AgentError> {
        match request.method {
            Method::GET => Ok(Reply::Text(self.history_json())),
            Method::POST => {
                let body: PromptBody = request.json()?;
                let prompt = parse_prompt(&body.prompt)?;
                let tokens = self.orchestrator.stream(self.history.messages(), &prompt).await?;
                self.pending_prompt = Some(prompt);
                Ok(Reply::Stream(tokens))
            }
            _ => Ok(Reply::Text(
                TextResponse::plain("Method not allowed").with_status(StatusCode::METHOD_NOT_ALLOWED),
            )),
        }
    }

    async fn on_message(&mut self, connection: &Connection, raw: &str) {
        let prompt = match serde_json::from_str::<PromptBody>(raw)
            .map_err(AgentError::from)
            .and_then(|body| parse_prompt(&body.prompt))
        {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::debug!(connection = %connection.id(), "rejected message: {}", e);
                connection.send(Envelope::error(e.to_string()));
                return;
            }
        };

        let tokens = match self.orchestrator.stream(self.history.messages(), &prompt).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(key = %self.key, "research failed: {}", e);
                connection.send(Envelope::error(e.to_string()));
                return;
            }
        };

        if let Some(full) = relay_stream(connection, tokens).await {
            self.history.record(prompt, full);
        }
    }

    fn methods(&self) -> &'static [RpcMethod] {
        &[RpcMethod::InitiateAgent]
    }

    async fn call(&mut self, call: RpcCall) -> Result<TextResponse, AgentError> {
        let prompt = match call {
            RpcCall::InitiateAgent { prompt } => parse_prompt(&prompt)?,
            other => return Err(AgentError::MethodNotFound(other.method().to_string())),
        };

        let tokens = self.orchestrator.stream(self.history.messages(), &prompt).await?;
        let full: String = tokens.try_collect().await?;
        self.history.record(prompt, full.clone());
        Ok(TextResponse::plain(full))
    }

    fn on_reply_complete(&mut self, full: &str) {
        if let Some(prompt) = self.pending_prompt.take() {
            self.history.record(prompt, full);
        }
    }
}
