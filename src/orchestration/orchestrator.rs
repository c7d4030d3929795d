//! 编排对象：固定模型 + 系统提示词 + 工具集 + 最大推理步数
//!
//! run：Plan -> Act (Tool) -> Observe 循环，直到模型给出纯文本回复或达到步数上限。
//! stream：同一循环，但每一步都走模型的流式接口。首个非空白字符不是 `{` / ``` 时即判定为最终回复，
//! 剩余 Token 原样转交调用方；否则读完整步输出按工具调用处理。

use std::sync::Arc;
use std::time::Duration;

use futures_util::{stream, StreamExt, TryStreamExt};
use serde_json::Value;
use tokio::time::timeout;

use crate::config::AgentSection;
use crate::core::AgentError;
use crate::llm::{LlmClient, LlmError, TokenStream};
use crate::memory::Message;
use crate::orchestration::planner::{extract_json, parse_llm_output, PlannerOutput};
use crate::tools::ToolExecutor;

/// 工具调用 JSON 解析失败时注入的提示
const RETRY_HINT: &str = "Your last message looked like a tool call but was not valid JSON. \
Reply with ONLY {\"tool\": \"<name>\", \"args\": {...}} or answer in plain text.";

pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
    tools: Arc<ToolExecutor>,
    max_steps: usize,
    chunk_chars: usize,
    request_timeout: Duration,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        let defaults = AgentSection::default();
        Self {
            llm,
            system_prompt: system_prompt.into(),
            tools: Arc::new(ToolExecutor::empty()),
            max_steps: defaults.max_steps,
            chunk_chars: defaults.chunk_chars,
            request_timeout: Duration::from_secs(defaults.request_timeout_secs),
        }
    }

    /// 按 [agent] 配置设置步数上限、分段宽度与超时
    pub fn with_settings(self, settings: &AgentSection) -> Self {
        self.with_max_steps(settings.max_steps)
            .with_chunk_chars(settings.chunk_chars)
            .with_timeout(Duration::from_secs(settings.request_timeout_secs))
    }

    pub fn with_tools(mut self, tools: ToolExecutor) -> Self {
        self.tools = Arc::new(tools);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn with_chunk_chars(mut self, chunk_chars: usize) -> Self {
        self.chunk_chars = chunk_chars.max(1);
        self
    }

    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    fn messages(&self, history: &[Message], prompt: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.system_prompt.clone()));
        messages.extend_from_slice(history);
        messages.push(Message::user(prompt));
        messages
    }

    fn timeout_error(&self) -> AgentError {
        AgentError::Llm(LlmError::Timeout(self.request_timeout.as_secs()))
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, AgentError> {
        timeout(self.request_timeout, self.llm.complete(messages))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(AgentError::from)
    }

    /// 执行工具并生成回填给模型的观察文本；工具失败不终止循环
    async fn observe(&self, tool: &str, args: Value) -> String {
        match self.tools.execute(tool, args).await {
            Ok(result) => format!("Observation from {}: {}", tool, result),
            Err(e) => format!(
                "Tool {} failed: {}. Try another approach or answer directly.",
                tool, e
            ),
        }
    }

    /// 非流式：跑完推理循环，返回最终回复
    pub async fn run(&self, history: &[Message], prompt: &str) -> Result<String, AgentError> {
        let mut messages = self.messages(history, prompt);

        if self.tools.registry().is_empty() {
            return self.complete(&messages).await;
        }

        for step in 1..=self.max_steps {
            let output = self.complete(&messages).await?;
            match parse_llm_output(&output) {
                Ok(PlannerOutput::Response(text)) => {
                    tracing::debug!(step, "final answer");
                    return Ok(text);
                }
                Ok(PlannerOutput::ToolCall(call)) => {
                    tracing::debug!(step, tool = %call.tool, "tool call");
                    let observation = self.observe(&call.tool, call.args).await;
                    messages.push(Message::assistant(output));
                    messages.push(Message::user(observation));
                }
                Err(e) => {
                    tracing::warn!(step, "unparseable tool call: {}", e);
                    messages.push(Message::assistant(output));
                    messages.push(Message::user(RETRY_HINT));
                }
            }
        }

        Err(AgentError::StepLimitExceeded(self.max_steps))
    }

    async fn open_stream(&self, messages: &[Message]) -> Result<TokenStream, AgentError> {
        timeout(self.request_timeout, self.llm.complete_stream(messages))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(AgentError::from)
    }

    /// 流式：返回 'static 的 Token 流；最终回复边生成边产出
    pub async fn stream(&self, history: &[Message], prompt: &str) -> Result<TokenStream, AgentError> {
        let mut messages = self.messages(history, prompt);

        if self.tools.registry().is_empty() {
            return self.open_stream(&messages).await;
        }

        for step in 1..=self.max_steps {
            let mut tokens = self.open_stream(&messages).await?;

            let mut head = String::new();
            while head.trim_start().is_empty() {
                let next = timeout(self.request_timeout, tokens.next())
                    .await
                    .map_err(|_| self.timeout_error())?;
                match next.transpose()? {
                    Some(token) => head.push_str(&token),
                    None => break,
                }
            }

            if !may_be_tool_call(&head) {
                tracing::debug!(step, "streaming final answer");
                let first: Option<Result<String, LlmError>> = (!head.is_empty()).then(|| Ok(head));
                let live: TokenStream = Box::pin(stream::iter(first).chain(tokens));
                return Ok(live);
            }

            let rest = timeout(self.request_timeout, tokens.try_collect::<String>())
                .await
                .map_err(|_| self.timeout_error())??;
            let output = head + &rest;

            match parse_llm_output(&output) {
                Ok(PlannerOutput::Response(text)) => {
                    tracing::debug!(step, "final answer (structured)");
                    return Ok(chunk_stream(&text, self.chunk_chars));
                }
                Ok(PlannerOutput::ToolCall(call)) => {
                    tracing::debug!(step, tool = %call.tool, "tool call");
                    let observation = self.observe(&call.tool, call.args).await;
                    messages.push(Message::assistant(output));
                    messages.push(Message::user(observation));
                }
                Err(e) => {
                    tracing::warn!(step, "unparseable tool call: {}", e);
                    messages.push(Message::assistant(output));
                    messages.push(Message::user(RETRY_HINT));
                }
            }
        }

        Err(AgentError::StepLimitExceeded(self.max_steps))
    }

    /// 结构化输出：返回模型回复中的 JSON 对象
    pub async fn complete_json(&self, prompt: &str) -> Result<Value, AgentError> {
        let output = self.complete(&self.messages(&[], prompt)).await?;
        let json = extract_json(&output)
            .ok_or_else(|| AgentError::StructuredOutput("no JSON object in model output".to_string()))?;
        serde_json::from_str(json).map_err(|e| AgentError::StructuredOutput(e.to_string()))
    }
}

/// 工具调用总以 JSON 对象或 ```json 代码块开头
fn may_be_tool_call(head: &str) -> bool {
    let head = head.trim_start();
    head.starts_with('{') || head.starts_with('`')
}

/// 把完整文本按字符数切段，模拟打字效果
pub fn chunk_stream(text: &str, chunk_chars: usize) -> TokenStream {
    let chars: Vec<char> = text.chars().collect();
    let chunks: Vec<Result<String, LlmError>> = chars
        .chunks(chunk_chars.max(1))
        .map(|c| Ok(c.iter().collect()))
        .collect();
    Box::pin(stream::iter(chunks))
}
