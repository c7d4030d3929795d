//! StudioAgent（studio-agent）：Prompt 模板类功能，只经 RPC 调用
//!
//! generate_recipe / generate_heroes 返回纯文本；classify 返回 `{kind, result}`，
//! result 已按对应分类的类型化 Schema 校验。

use async_trait::async_trait;
use serde_json::json;

use crate::agents::parse_prompt;
use crate::core::AgentError;
use crate::orchestration::Orchestrator;
use crate::prompts::{heroes_prompt, recipe_prompt, ClassificationKind, STUDIO_SYSTEM_PROMPT};
use crate::runtime::{Agent, AgentContext, RpcCall, RpcMethod, TextResponse};

pub struct StudioAgent {
    orchestrator: Orchestrator,
}

impl StudioAgent {
    pub const CLASS_NAME: &'static str = "StudioAgent";

    pub fn new(ctx: AgentContext) -> Self {
        Self {
            orchestrator: Orchestrator::new(ctx.llm, STUDIO_SYSTEM_PROMPT).with_settings(&ctx.settings),
        }
    }

    async fn classify(&self, text: &str, kind: ClassificationKind) -> Result<TextResponse, AgentError> {
        let value = self.orchestrator.complete_json(&kind.prompt(text)).await?;
        let result = kind.validate(value).map_err(AgentError::StructuredOutput)?;
        tracing::debug!(kind = %kind, "classification validated");
        Ok(TextResponse::json(&json!({
            "kind": kind.as_str(),
            "result": result,
        })))
    }
}

#[async_trait]
impl Agent for StudioAgent {
    fn methods(&self) -> &'static [RpcMethod] {
        &[
            RpcMethod::GenerateRecipe,
            RpcMethod::GenerateHeroes,
            RpcMethod::Classify,
        ]
    }

    async fn call(&mut self, call: RpcCall) -> Result<TextResponse, AgentError> {
        match call {
            RpcCall::GenerateRecipe { cuisine } => {
                let text = self.orchestrator.run(&[], &recipe_prompt(&cuisine)).await?;
                Ok(TextResponse::plain(text))
            }
            RpcCall::GenerateHeroes { count, genre } => {
                let count = u8::try_from(count).unwrap_or(u8::MAX);
                let text = self
                    .orchestrator
                    .run(&[], &heroes_prompt(count, genre.as_deref()))
                    .await?;
                Ok(TextResponse::plain(text))
            }
            RpcCall::Classify { text, kind } => {
                let text = parse_prompt(&text)?;
                self.classify(&text, ClassificationKind::from_key(kind.as_deref())).await
            }
            other => Err(AgentError::MethodNotFound(other.method().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentSection;
    use crate::llm::{LlmClient, MockLlmClient, ScriptedLlmClient};
    use std::sync::Arc;

    fn agent(llm: Arc<dyn LlmClient>) -> StudioAgent {
        StudioAgent::new(AgentContext {
            llm,
            settings: AgentSection::default(),
            key: "default".to_string(),
        })
    }

    #[tokio::test]
    async fn test_recipe_is_plain_text() {
        let mut agent = agent(Arc::new(MockLlmClient));
        let response = agent
            .call(RpcCall::GenerateRecipe {
                cuisine: "Thai".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.content_type, crate::runtime::agent::TEXT_PLAIN);
        assert!(response.body.contains("Thai dish"));
    }

    #[tokio::test]
    async fn test_heroes_count_is_clamped() {
        let llm = Arc::new(ScriptedLlmClient::new(["heroes"]));
        let mut agent = agent(llm.clone());
        agent
            .call(RpcCall::GenerateHeroes {
                count: 1000,
                genre: None,
            })
            .await
            .unwrap();
        let calls = llm.calls();
        let prompt = &calls[0].last().unwrap().content;
        assert!(prompt.starts_with("Invent 10 original fantasy heroes."));
    }

    #[tokio::test]
    async fn test_classify_each_kind_with_mock() {
        let mut agent = agent(Arc::new(MockLlmClient));
        for (key, field) in [("sentiment", "sentiment"), ("genre", "genre"), ("priority", "priority")] {
            let response = agent
                .call(RpcCall::Classify {
                    text: "The release went great".to_string(),
                    kind: Some(key.to_string()),
                })
                .await
                .unwrap();
            let v: serde_json::Value = serde_json::from_str(&response.body).unwrap();
            assert_eq!(v["kind"], key);
            assert!(v["result"].get(field).is_some(), "{}: {}", key, response.body);
        }
    }

    #[tokio::test]
    async fn test_classify_unknown_kind_falls_back_to_sentiment() {
        let mut agent = agent(Arc::new(MockLlmClient));
        let response = agent
            .call(RpcCall::Classify {
                text: "meh".to_string(),
                kind: Some("astrology".to_string()),
            })
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(v["kind"], "sentiment");
    }

    #[tokio::test]
    async fn test_classify_rejects_off_schema_output() {
        let llm = Arc::new(ScriptedLlmClient::new([r#"{"sentiment": "ecstatic", "confidence": 2.0}"#]));
        let mut agent = agent(llm);
        let err = agent
            .call(RpcCall::Classify {
                text: "wow".to_string(),
                kind: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::StructuredOutput(_)));
    }

    #[tokio::test]
    async fn test_classify_requires_text() {
        let mut agent = agent(Arc::new(MockLlmClient));
        let err = agent
            .call(RpcCall::Classify {
                text: " ".to_string(),
                kind: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::EmptyPrompt));
    }
}
