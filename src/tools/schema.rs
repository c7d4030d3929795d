//! 工具调用 JSON Schema（schemars 生成），拼入 system prompt 以减少格式错误

use schemars::{schema_for, JsonSchema};
use serde_json::Value;

/// 工具调用请求格式：与 parse_llm_output 解析的 `{"tool": "...", "args": {...}}` 一致（仅用于 Schema 生成）
#[allow(dead_code)]
#[derive(JsonSchema)]
struct ToolCallFormat {
    /// 工具名，如 city_lookup、city_distance
    tool: String,
    /// 工具参数，依工具不同而不同
    args: Value,
}

pub fn tool_call_schema_json() -> String {
    let schema = schema_for!(ToolCallFormat);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_tool_and_args() {
        let schema: Value = serde_json::from_str(&tool_call_schema_json()).unwrap();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&Value::from("tool")));
        assert!(required.contains(&Value::from("args")));
    }
}
