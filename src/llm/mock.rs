//! Mock LLM 客户端（用于测试与无 API Key 的本地运行）
//!
//! - MockLlmClient：确定性回复，流式按词切分
//! - ScriptedLlmClient：按顺序回放预置回复，便于驱动工具调用循环

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::stream;

use crate::llm::{LlmClient, LlmError, TokenStream};
use crate::memory::{Message, Role};
use crate::prompts::EXAMPLE_OUTPUT_PREFIX;

/// 把一段文本切成「词 + 尾随空白」的 Token 流
pub fn word_stream(text: &str) -> TokenStream {
    let tokens: Vec<Result<String, LlmError>> = text
        .split_inclusive(' ')
        .map(|t| Ok(t.to_string()))
        .collect();
    Box::pin(stream::iter(tokens))
}

/// Mock 客户端：回显用户最后一条消息
#[derive(Debug, Default)]
pub struct MockLlmClient;

impl MockLlmClient {
    /// Prompt 里带示例输出行时直接回该示例 JSON
    fn reply(messages: &[Message]) -> String {
        let example = messages.iter().rev().find_map(|m| {
            m.content
                .lines()
                .find_map(|line| line.trim().strip_prefix(EXAMPLE_OUTPUT_PREFIX))
        });
        if let Some(json) = example {
            return json.trim().to_string();
        }

        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");
        format!("Mock reply to: {}", last_user)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        Ok(Self::reply(messages))
    }

    async fn complete_stream(&self, messages: &[Message]) -> Result<TokenStream, LlmError> {
        Ok(word_stream(&Self::reply(messages)))
    }
}

/// 预置回复队列；队列耗尽后返回 Api 错误
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedLlmClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// 每次调用收到的完整消息列表（按调用顺序）
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn next(&self, messages: &[Message]) -> Result<String, LlmError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(messages.to_vec());
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .ok_or_else(|| LlmError::Api("script exhausted".to_string()))
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.next(messages)
    }

    async fn complete_stream(&self, messages: &[Message]) -> Result<TokenStream, LlmError> {
        Ok(word_stream(&self.next(messages)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_mock_echoes_last_user_message() {
        let reply = MockLlmClient
            .complete(&[Message::system("sys"), Message::user("hello there")])
            .await
            .unwrap();
        assert_eq!(reply, "Mock reply to: hello there");
    }

    #[tokio::test]
    async fn test_mock_returns_example_output() {
        let prompt = format!("Classify this.\n{}{{\"a\":1}}", EXAMPLE_OUTPUT_PREFIX);
        let reply = MockLlmClient.complete(&[Message::user(prompt)]).await.unwrap();
        assert_eq!(reply, r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_mock_stream_splits_words() {
        let stream = MockLlmClient
            .complete_stream(&[Message::user("a b")])
            .await
            .unwrap();
        let tokens: Vec<String> = stream.map(|t| t.unwrap()).collect().await;
        assert!(tokens.len() > 1);
        assert_eq!(tokens.concat(), "Mock reply to: a b");
    }

    #[tokio::test]
    async fn test_scripted_exhausts() {
        let llm = ScriptedLlmClient::new(["one"]);
        assert_eq!(llm.complete(&[]).await.unwrap(), "one");
        assert!(llm.complete(&[]).await.is_err());
        assert_eq!(llm.calls().len(), 2);
    }
}
