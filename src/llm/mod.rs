//! LLM 层：客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）

pub mod deepseek;
pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use crate::config::LlmSection;

pub use deepseek::create_deepseek_client;
pub use mock::{MockLlmClient, ScriptedLlmClient};
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::{LlmClient, LlmError, TokenStream};

/// 按配置创建 LLM 客户端
///
/// provider = mock 时直接用 Mock；否则需要对应的 API Key（唯一必需的密钥），
/// 缺失时告警并退回 Mock，便于本地跑通全部路由。
pub fn create_llm_from_config(cfg: &LlmSection) -> Arc<dyn LlmClient> {
    let provider = cfg.provider.to_lowercase();

    match provider.as_str() {
        "mock" => {
            tracing::info!("Using Mock LLM");
            Arc::new(MockLlmClient)
        }
        "deepseek" => match std::env::var("DEEPSEEK_API_KEY") {
            Ok(key) => {
                let client = create_deepseek_client(cfg.deepseek.model.as_deref(), &key);
                tracing::info!("Using DeepSeek LLM ({})", client.model());
                Arc::new(client)
            }
            Err(_) => {
                tracing::warn!("DEEPSEEK_API_KEY not set, using Mock LLM");
                Arc::new(MockLlmClient)
            }
        },
        _ => match std::env::var("OPENAI_API_KEY") {
            Ok(key) => {
                tracing::info!("Using OpenAI-compatible LLM ({})", cfg.model);
                Arc::new(OpenAiClient::new(cfg.base_url.as_deref(), &cfg.model, &key))
            }
            Err(_) => {
                tracing::warn!("OPENAI_API_KEY not set, using Mock LLM");
                Arc::new(MockLlmClient)
            }
        },
    }
}
