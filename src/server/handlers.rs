//! 路由处理函数：转发、方法调用、自动路由与静态内容

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, Query, Request, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::AgentError;
use crate::data::cities;
use crate::runtime::{route_agent_request, AgentRequest, RpcCall, RpcMethod};
use crate::server::{ApiError, AppState};

/// 未提供 userId 时使用的实例 key
pub const DEFAULT_KEY: &str = "default";

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// 空请求体按 `{}` 处理；无法解析 → MalformedPayload（500）
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AgentError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(json!({}))?);
    }
    Ok(serde_json::from_slice(body)?)
}

/// userId 为空或缺失时回退到 "default"
pub fn instance_key(user_id: Option<&str>) -> &str {
    user_id
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .unwrap_or(DEFAULT_KEY)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForwardBody {
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    user_id: Option<String>,
}

/// HTTP → 实例通用入口：只携带规整后的 prompt
pub async fn forward(state: &AppState, agent: &str, body: Bytes) -> Result<Response, ApiError> {
    let body: ForwardBody = parse_body(&body)?;
    let key = instance_key(body.user_id.as_deref());

    let handle = state.registry.get_agent_by_name(agent, key).await?;
    let request = AgentRequest::post_json("/", &json!({ "prompt": body.prompt.trim() }));
    tracing::debug!(agent, key, "forwarding request");
    Ok(handle.fetch(request).await?.into_response())
}

/// HTTP → 实例具名方法：返回完整缓冲的文本
pub async fn invoke(
    state: &AppState,
    agent: &str,
    method: RpcMethod,
    body: Bytes,
) -> Result<Response, ApiError> {
    let args: Value = parse_body(&body)?;
    let key = instance_key(args.get("userId").and_then(Value::as_str)).to_string();
    let call = RpcCall::decode(method, args)?;

    let handle = state.registry.get_agent_by_name(agent, &key).await?;
    tracing::debug!(agent, key = %key, %method, "invoking method");
    Ok(handle.call(call).await?.into_response())
}

/// ALL /agents、/agents/、/agents/*path
pub async fn auto_route(
    State(state): State<AppState>,
    path: Option<Path<String>>,
    ws: Option<WebSocketUpgrade>,
    request: Request,
) -> Response {
    let path = path.map(|Path(p)| p).unwrap_or_default();
    let body_limit = state.config.server.body_limit_bytes;
    match route_agent_request(&state.registry, &path, ws, request, body_limit).await {
        Some(response) => response,
        None => ApiError(AgentError::AgentNotFound(path)).into_response(),
    }
}

pub async fn health() -> &'static str {
    "OK"
}

/// 已注册的 Agent 与模型累计 token 用量
pub async fn hello(State(state): State<AppState>) -> Json<Value> {
    let (prompt_tokens, completion_tokens, total_tokens) = state.llm.token_usage();
    Json(json!({
        "message": "Hello from hive",
        "agents": state.registry.agent_names(),
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": total_tokens,
        },
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct CitiesQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// 城市列表：`?q=` 按名称或国家过滤，按国家分组
pub async fn cities(Query(query): Query<CitiesQuery>) -> Json<Value> {
    let q = query.q.unwrap_or_default();
    let matches = cities::search(&q);
    Json(json!({
        "query": q.trim(),
        "count": matches.len(),
        "countries": cities::by_country(&matches),
    }))
}

pub async fn page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_key_fallback() {
        assert_eq!(instance_key(Some("u1")), "u1");
        assert_eq!(instance_key(Some("  ")), DEFAULT_KEY);
        assert_eq!(instance_key(None), DEFAULT_KEY);
    }

    #[test]
    fn test_parse_body() {
        let empty: ForwardBody = parse_body(&Bytes::from_static(b"  ")).unwrap();
        assert!(empty.prompt.is_empty());

        let body: ForwardBody =
            parse_body(&Bytes::from_static(br#"{"prompt":"hi","userId":"u9"}"#)).unwrap();
        assert_eq!(body.user_id.as_deref(), Some("u9"));

        let err = parse_body::<ForwardBody>(&Bytes::from_static(b"{oops")).unwrap_err();
        assert!(matches!(err, AgentError::MalformedPayload(_)));
    }
}
