//! RPC 方法枚举
//!
//! 可远程调用的方法是封闭集合；调用参数在进入实例前就解码成带类型的 RpcCall。

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::AgentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcMethod {
    InitiateAgent,
    GenerateRecipe,
    GenerateHeroes,
    Classify,
}

impl RpcMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            RpcMethod::InitiateAgent => "initiate_agent",
            RpcMethod::GenerateRecipe => "generate_recipe",
            RpcMethod::GenerateHeroes => "generate_heroes",
            RpcMethod::Classify => "classify",
        }
    }
}

impl std::fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_hero_count() -> u32 {
    3
}

/// 一次 RPC 调用：方法名 + 已解码参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "args", rename_all = "snake_case")]
pub enum RpcCall {
    InitiateAgent {
        #[serde(default)]
        prompt: String,
    },
    GenerateRecipe {
        #[serde(default)]
        cuisine: String,
    },
    GenerateHeroes {
        #[serde(default = "default_hero_count")]
        count: u32,
        #[serde(default)]
        genre: Option<String>,
    },
    Classify {
        #[serde(default)]
        text: String,
        #[serde(default)]
        kind: Option<String>,
    },
}

impl RpcCall {
    /// 按方法名解码参数；args 中多余字段（如 userId）忽略，缺失或为 null 视为空对象
    pub fn decode(method: RpcMethod, args: Value) -> Result<Self, AgentError> {
        let args = if args.is_null() { json!({}) } else { args };
        Ok(serde_json::from_value(json!({
            "method": method.as_str(),
            "args": args,
        }))?)
    }

    pub fn method(&self) -> RpcMethod {
        match self {
            RpcCall::InitiateAgent { .. } => RpcMethod::InitiateAgent,
            RpcCall::GenerateRecipe { .. } => RpcMethod::GenerateRecipe,
            RpcCall::GenerateHeroes { .. } => RpcMethod::GenerateHeroes,
            RpcCall::Classify { .. } => RpcMethod::Classify,
        }
    }
}
