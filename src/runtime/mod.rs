//! 按 key 寻址的 Agent 运行时
//!
//! - **agent**: Agent 能力接口、请求/响应类型
//! - **envelope**: WebSocket 信封与连接句柄
//! - **instance**: 每个实例一个 Actor 任务
//! - **registry**: 类名 → 工厂，(name, key) → 实例
//! - **router**: /agents/* 自动路由
//! - **rpc**: 可调用方法的封闭枚举

pub mod agent;
pub mod envelope;
pub mod instance;
pub mod registry;
pub mod router;
pub mod rpc;

pub use agent::{Agent, AgentBody, AgentRequest, AgentResponse, Reply, TextResponse};
pub use envelope::{relay_stream, Connection, Envelope};
pub use instance::AgentHandle;
pub use registry::{to_kebab_case, AgentContext, AgentFactory, AgentRegistry};
pub use router::{parse_agent_path, route_agent_request};
pub use rpc::{RpcCall, RpcMethod};
