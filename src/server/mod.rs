//! 路由分发层：按 ROUTE_TABLE 顺序构建 axum Router

pub mod error;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::routing::{any, get, post};
use axum::Router;
use bytes::Bytes;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::agents::register_default_agents;
use crate::config::AppConfig;
use crate::core::ShutdownManager;
use crate::llm::{create_llm_from_config, LlmClient};
use crate::runtime::AgentRegistry;

pub use error::ApiError;
pub use routes::{RouteEntry, StaticRoute, Strategy, ROUTE_TABLE};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AgentRegistry>,
    pub llm: Arc<dyn LlmClient>,
    pub config: Arc<AppConfig>,
}

/// 按路由表顺序注册；Page 作为 fallback 兜底
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new();
    for entry in ROUTE_TABLE {
        router = match entry.strategy {
            Strategy::AutoRoute => router.route(entry.pattern, any(handlers::auto_route)),
            Strategy::Forward { agent } => router.route(
                entry.pattern,
                post(move |State(state): State<AppState>, body: Bytes| async move {
                    handlers::forward(&state, agent, body).await
                }),
            ),
            Strategy::Invoke { agent, method } => router.route(
                entry.pattern,
                post(move |State(state): State<AppState>, body: Bytes| async move {
                    handlers::invoke(&state, agent, method, body).await
                }),
            ),
            Strategy::Static(StaticRoute::Health) => router.route(entry.pattern, get(handlers::health)),
            Strategy::Static(StaticRoute::Hello) => router.route(entry.pattern, get(handlers::hello)),
            Strategy::Static(StaticRoute::Cities) => router.route(entry.pattern, get(handlers::cities)),
            Strategy::Page => router.fallback(handlers::page),
        };
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// 注册内置 Agent 并构建完整应用
pub fn build_app(config: &AppConfig, llm: Arc<dyn LlmClient>) -> Router {
    let mut registry = AgentRegistry::new(Arc::clone(&llm), config.agent.clone());
    register_default_agents(&mut registry);
    tracing::info!(agents = ?registry.agent_names(), "agents registered");

    build_router(AppState {
        registry: Arc::new(registry),
        llm,
        config: Arc::new(config.clone()),
    })
}

/// 绑定地址并运行，直到收到 Ctrl+C / SIGTERM
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let llm = create_llm_from_config(&config.llm);
    let app = build_app(&config, llm);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    tracing::info!("hive listening on http://{}", listener.local_addr()?);

    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.install_signal_handlers();
    let token = shutdown.token();

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await
        .context("Server error")?;

    tracing::info!("hive stopped");
    Ok(())
}
