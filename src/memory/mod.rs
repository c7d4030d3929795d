//! 记忆层：实例内的短期对话历史（实例随进程存活，不做持久化）

pub mod conversation;

pub use conversation::{ConversationHistory, Message, Role};
