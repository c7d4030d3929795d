//! 短期记忆：单个 Agent 实例的对话历史
//!
//! 保留最近 N 轮（user + assistant），超出时从最旧的一轮开始丢弃。

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 单条消息
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 对话历史：只记录完整的一问一答
#[derive(Clone, Debug)]
pub struct ConversationHistory {
    messages: Vec<Message>,
    max_turns: usize,
}

impl ConversationHistory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_turns,
        }
    }

    /// 记录一轮问答；回答为空（流被中断）时不记录
    pub fn record(&mut self, prompt: impl Into<String>, reply: impl Into<String>) {
        let reply = reply.into();
        if reply.is_empty() {
            return;
        }
        self.messages.push(Message::user(prompt));
        self.messages.push(Message::assistant(reply));
        self.prune();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// 已记录的轮数
    pub fn turns(&self) -> usize {
        self.messages.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn prune(&mut self) {
        let keep = self.max_turns * 2;
        if self.messages.len() > keep {
            self.messages.drain(..self.messages.len() - keep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_prune() {
        let mut history = ConversationHistory::new(2);
        history.record("q1", "a1");
        history.record("q2", "a2");
        history.record("q3", "a3");

        assert_eq!(history.turns(), 2);
        assert_eq!(history.messages()[0], Message::user("q2"));
        assert_eq!(history.messages()[3], Message::assistant("a3"));
    }

    #[test]
    fn test_empty_reply_not_recorded() {
        let mut history = ConversationHistory::new(4);
        history.record("q1", "");
        assert!(history.is_empty());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }
}
