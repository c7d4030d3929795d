//! 具体的 Agent 容器类

pub mod research;
pub mod studio;

use serde::Deserialize;

use crate::core::AgentError;
use crate::runtime::{Agent, AgentRegistry};

pub use research::ResearchAgent;
pub use studio::StudioAgent;

/// `{ "prompt": ... }` 请求体 / WebSocket 帧
#[derive(Debug, Default, Deserialize)]
pub struct PromptBody {
    #[serde(default)]
    pub prompt: String,
}

/// 去掉首尾空白；为空则拒绝
pub fn parse_prompt(raw: &str) -> Result<String, AgentError> {
    let prompt = raw.trim();
    if prompt.is_empty() {
        return Err(AgentError::EmptyPrompt);
    }
    Ok(prompt.to_string())
}

/// 注册内置 Agent 类（research-agent / studio-agent）
pub fn register_default_agents(registry: &mut AgentRegistry) {
    registry.register(ResearchAgent::CLASS_NAME, |ctx| -> Box<dyn Agent> {
        Box::new(ResearchAgent::new(ctx))
    });
    registry.register(StudioAgent::CLASS_NAME, |ctx| -> Box<dyn Agent> {
        Box::new(StudioAgent::new(ctx))
    });
}
