//! 编排层：模型输出解析 + 有界推理循环

pub mod orchestrator;
pub mod planner;

pub use orchestrator::{chunk_stream, Orchestrator};
pub use planner::{extract_json, parse_llm_output, PlannerOutput, ToolCall};
