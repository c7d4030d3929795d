//! hive-client：从命令行体验四种接入方式
//!
//! ```text
//! hive-client ws "Plan a trip to Tokyo" --user u1
//! hive-client http "Compare Kyoto and Osaka"
//! hive-client rpc recipe --arg cuisine=Thai
//! hive-client auto research-agent u1 --prompt "What is in Osaka?"
//! ```

use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hive::client::HiveClient;
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hive-client", version, about = "Talk to a running hive server")]
struct Cli {
    /// 服务地址
    #[arg(long, default_value = "http://127.0.0.1:8787", global = true)]
    url: String,

    /// 实例 key（userId）
    #[arg(long, short, default_value = "default", global = true)]
    user: String,

    /// 日志详细程度（-v / -vv）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// WebSocket 中继：/agents/research-agent/<user>
    Ws { prompt: String },
    /// HTTP 转发：POST /api/research，流式输出
    Http { prompt: String },
    /// RPC 方法：POST /api/<feature>
    Rpc {
        feature: Feature,
        /// key=value 参数，可重复
        #[arg(long = "arg", value_parser = parse_key_val)]
        args: Vec<(String, String)>,
    },
    /// 自动路由：POST /agents/<agent>/<key>
    Auto {
        agent: String,
        key: String,
        #[arg(long)]
        prompt: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Feature {
    Initiate,
    Recipe,
    Heroes,
    Classify,
}

impl Feature {
    fn path(self) -> &'static str {
        match self {
            Feature::Initiate => "/api/research/initiate",
            Feature::Recipe => "/api/recipe",
            Feature::Heroes => "/api/heroes",
            Feature::Classify => "/api/classify",
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{}`", s))
}

/// 数字参数按数字发送（如 count=3）
fn args_to_json(args: &[(String, String)], user: &str) -> Value {
    let mut map = Map::new();
    for (k, v) in args {
        let value = v
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(v.clone()));
        map.insert(k.clone(), value);
    }
    map.insert("userId".to_string(), Value::String(user.to_string()));
    Value::Object(map)
}

fn print_chunk(chunk: &str) {
    print!("{}", chunk);
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let client = HiveClient::new(&cli.url);

    match cli.command {
        Command::Ws { prompt } => {
            client
                .chat_ws("research-agent", &cli.user, &prompt, print_chunk)
                .await
                .context("WebSocket chat failed")?;
        }
        Command::Http { prompt } => {
            let body = json!({ "prompt": prompt, "userId": cli.user });
            client
                .stream_text("/api/research", &body, print_chunk)
                .await
                .context("Streaming request failed")?;
        }
        Command::Rpc { feature, args } => {
            let body = args_to_json(&args, &cli.user);
            let text = client
                .post_text(feature.path(), &body)
                .await
                .context("RPC request failed")?;
            print!("{}", text);
        }
        Command::Auto { agent, key, prompt } => {
            if key.trim().is_empty() {
                bail!("key must not be empty");
            }
            let path = format!("/agents/{}/{}", agent, key);
            client
                .stream_text(&path, &json!({ "prompt": prompt }), print_chunk)
                .await
                .context("Auto-routed request failed")?;
        }
    }

    println!();
    Ok(())
}
