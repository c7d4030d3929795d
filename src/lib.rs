//! Hive - Agent 接入示例服务
//!
//! 模块划分：
//! - **agents**: 具体的 Agent 容器（ResearchAgent / StudioAgent）
//! - **client**: 前端适配器的 Rust 版本（HTTP 流式读取 + WebSocket 信封渲染）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型与优雅关闭
//! - **data**: 静态参考数据（城市表）
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **memory**: 每个 Agent 实例的对话历史
//! - **observability**: 日志初始化
//! - **orchestration**: 推理循环（模型 + 工具 + 步数上限）
//! - **prompts**: Prompt 模板与结构化输出 Schema
//! - **runtime**: 按 key 寻址的 Agent 实例运行时（Actor + 注册表 + 自动路由）
//! - **server**: 路由分发层（有序路由表）
//! - **tools**: 工具注册表与执行器

pub mod agents;
pub mod client;
pub mod config;
pub mod core;
pub mod data;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod orchestration;
pub mod prompts;
pub mod runtime;
pub mod server;
pub mod tools;

pub use config::{load_config, AppConfig};
pub use server::{build_app, serve, AppState};
