//! 有序路由表
//!
//! 通配的 /agents/* 必须排在兜底页面之前；build_router 按表顺序注册。

use crate::runtime::RpcMethod;

/// 无业务逻辑的静态路由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticRoute {
    Health,
    Hello,
    Cities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// 交给 route_agent_request 解析 <name>/<key>
    AutoRoute,
    /// 解析请求体后构造新的 POST 请求，经实例的通用 HTTP 入口转发
    Forward { agent: &'static str },
    /// 直接调用实例上的具名方法
    Invoke {
        agent: &'static str,
        method: RpcMethod,
    },
    Static(StaticRoute),
    /// 兜底：静态演示页面
    Page,
}

#[derive(Debug, Clone, Copy)]
pub struct RouteEntry {
    pub pattern: &'static str,
    pub strategy: Strategy,
}

pub const RESEARCH_AGENT: &str = "research-agent";
pub const STUDIO_AGENT: &str = "studio-agent";

pub const ROUTE_TABLE: &[RouteEntry] = &[
    RouteEntry {
        pattern: "/agents/*path",
        strategy: Strategy::AutoRoute,
    },
    // 通配不匹配空尾段，单独登记以免落到兜底页面
    RouteEntry {
        pattern: "/agents",
        strategy: Strategy::AutoRoute,
    },
    RouteEntry {
        pattern: "/agents/",
        strategy: Strategy::AutoRoute,
    },
    RouteEntry {
        pattern: "/api/health",
        strategy: Strategy::Static(StaticRoute::Health),
    },
    RouteEntry {
        pattern: "/api/hello",
        strategy: Strategy::Static(StaticRoute::Hello),
    },
    RouteEntry {
        pattern: "/api/cities",
        strategy: Strategy::Static(StaticRoute::Cities),
    },
    RouteEntry {
        pattern: "/api/research",
        strategy: Strategy::Forward {
            agent: RESEARCH_AGENT,
        },
    },
    RouteEntry {
        pattern: "/api/research/initiate",
        strategy: Strategy::Invoke {
            agent: RESEARCH_AGENT,
            method: RpcMethod::InitiateAgent,
        },
    },
    RouteEntry {
        pattern: "/api/recipe",
        strategy: Strategy::Invoke {
            agent: STUDIO_AGENT,
            method: RpcMethod::GenerateRecipe,
        },
    },
    RouteEntry {
        pattern: "/api/heroes",
        strategy: Strategy::Invoke {
            agent: STUDIO_AGENT,
            method: RpcMethod::GenerateHeroes,
        },
    },
    RouteEntry {
        pattern: "/api/classify",
        strategy: Strategy::Invoke {
            agent: STUDIO_AGENT,
            method: RpcMethod::Classify,
        },
    },
    RouteEntry {
        pattern: "*",
        strategy: Strategy::Page,
    },
];
