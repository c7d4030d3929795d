//! hive 服务入口：加载配置、初始化日志、启动 HTTP/WebSocket 服务
//!
//! 用法：`hive [config.toml]`

use std::path::PathBuf;

use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = hive::load_config(config_path).context("Failed to load config")?;

    hive::observability::init(&cfg.logging);

    hive::serve(cfg).await
}
