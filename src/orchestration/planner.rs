//! 模型输出解析：Tool Call 还是最终回复
//!
//! 先找 ```json 代码块，再找最外层 `{...}`；能解析成 `{"tool", "args"}` 且 tool 非空即为工具调用。

use serde::{Deserialize, Serialize};

use crate::core::AgentError;

/// LLM 返回的 Tool Call（简化 JSON：{"tool": "city_lookup", "args": {"name": "..."}}）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

#[derive(Debug, Clone)]
pub enum PlannerOutput {
    /// 直接回复用户
    Response(String),
    /// 需要执行工具
    ToolCall(ToolCall),
}

/// 从文本中取出 JSON 片段（```json 块优先，其次首个 `{` 到末个 `}`）
pub fn extract_json(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        return Some(rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim()));
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (end > start).then(|| &trimmed[start..=end])
}

/// 解析模型输出
///
/// 不含 JSON、或 JSON 与工具调用无关 → Response；
/// 明显是工具调用（含 "tool" 键）却解析失败 → JsonParseError，由循环注入重试提示。
pub fn parse_llm_output(output: &str) -> Result<PlannerOutput, AgentError> {
    let trimmed = output.trim();
    let Some(json_str) = extract_json(trimmed) else {
        return Ok(PlannerOutput::Response(trimmed.to_string()));
    };

    match serde_json::from_str::<ToolCall>(json_str) {
        Ok(call) if !call.tool.trim().is_empty() => Ok(PlannerOutput::ToolCall(call)),
        Ok(_) => Ok(PlannerOutput::Response(trimmed.to_string())),
        Err(e) if json_str.contains("\"tool\"") => {
            Err(AgentError::JsonParseError(format!("{}: {}", e, json_str)))
        }
        Err(_) => Ok(PlannerOutput::Response(trimmed.to_string())),
    }
}
