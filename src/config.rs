//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `HIVE__*` 覆盖（双下划线表示嵌套，如 `HIVE__LLM__PROVIDER=mock`）。
//! LLM 的 API Key 不放在配置文件里，只从 `OPENAI_API_KEY` / `DEEPSEEK_API_KEY` 读取。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub llm: LlmSection,
    pub agent: AgentSection,
    pub logging: LoggingSection,
}

/// [server] 段：监听地址、自动路由转发的请求体上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind_addr: String,
    pub body_limit_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8787".to_string(),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

/// [llm] 段：后端选择与模型
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// openai / deepseek / mock
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub deepseek: LlmDeepSeekSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            deepseek: LlmDeepSeekSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmDeepSeekSection {
    pub model: Option<String>,
}

/// [agent] 段：推理步数上限、邮箱容量、对话轮数、超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// 单次请求内最大推理步数（含工具调用）
    pub max_steps: usize,
    /// 每个实例邮箱的容量
    pub mailbox_capacity: usize,
    /// 缓冲后的回答重新分段流式输出时每段的字符数
    pub chunk_chars: usize,
    /// 每个实例保留的对话轮数
    pub history_turns: usize,
    pub tool_timeout_secs: u64,
    /// 单次模型调用超时（秒）；也是流式响应等待客户端读取的上限
    pub request_timeout_secs: u64,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_steps: 5,
            mailbox_capacity: 32,
            chunk_chars: 24,
            history_turns: 10,
            tool_timeout_secs: 10,
            request_timeout_secs: 60,
        }
    }
}

/// [logging] 段：默认过滤规则（RUST_LOG 优先）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: "hive=info,tower_http=info".to_string(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 HIVE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 HIVE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("HIVE")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.bind_addr, "127.0.0.1:8787");
        assert_eq!(cfg.agent.max_steps, 5);
        assert_eq!(cfg.llm.provider, "openai");
        assert!(cfg.logging.filter.contains("hive=info"));
    }

    #[test]
    fn test_load_explicit_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[llm]\nprovider = \"mock\"\n\n[agent]\nmax_steps = 2\nchunk_chars = 4\n"
        )
        .unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.llm.provider, "mock");
        assert_eq!(cfg.agent.max_steps, 2);
        assert_eq!(cfg.agent.chunk_chars, 4);
        // 未出现的键保持默认
        assert_eq!(cfg.agent.mailbox_capacity, 32);
        assert_eq!(cfg.server.body_limit_bytes, 1024 * 1024);
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let cfg = load_config(Some(PathBuf::from("/nonexistent/hive.toml"))).unwrap();
        assert_eq!(cfg.agent.history_turns, 10);
    }
}
