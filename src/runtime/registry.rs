//! Agent 注册表
//!
//! 按 kebab-case 类名注册工厂（ResearchAgent → research-agent），
//! get_agent_by_name(name, key) 懒创建并缓存每个 (name, key) 的唯一实例；实例不会过期。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::config::AgentSection;
use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::runtime::agent::Agent;
use crate::runtime::instance::AgentHandle;

/// 创建实例时交给工厂的上下文
#[derive(Clone)]
pub struct AgentContext {
    pub llm: Arc<dyn LlmClient>,
    pub settings: AgentSection,
    pub key: String,
}

pub type AgentFactory = Arc<dyn Fn(AgentContext) -> Box<dyn Agent> + Send + Sync>;

/// "ResearchAgent" → "research-agent"
pub fn to_kebab_case(class_name: &str) -> String {
    let mut out = String::with_capacity(class_name.len() + 4);
    let mut prev_lower = false;
    for c in class_name.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('-');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else if c == '_' || c == ' ' {
            out.push('-');
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

pub struct AgentRegistry {
    llm: Arc<dyn LlmClient>,
    settings: AgentSection,
    factories: BTreeMap<String, AgentFactory>,
    instances: RwLock<HashMap<(String, String), AgentHandle>>,
}

impl AgentRegistry {
    pub fn new(llm: Arc<dyn LlmClient>, settings: AgentSection) -> Self {
        Self {
            llm,
            settings,
            factories: BTreeMap::new(),
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// 注册 Agent 类，返回其绑定名（kebab-case）
    pub fn register<F>(&mut self, class_name: &str, factory: F) -> String
    where
        F: Fn(AgentContext) -> Box<dyn Agent> + Send + Sync + 'static,
    {
        let name = to_kebab_case(class_name);
        tracing::debug!(class = class_name, binding = %name, "agent registered");
        self.factories.insert(name.clone(), Arc::new(factory));
        name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn agent_names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub async fn instance_count(&self) -> usize {
        self.instances.read().await.len()
    }

    /// 取得 (name, key) 的实例，不存在则创建；实例任务已退出则重建
    pub async fn get_agent_by_name(&self, name: &str, key: &str) -> Result<AgentHandle, AgentError> {
        if key.trim().is_empty() {
            return Err(AgentError::InvalidKey);
        }
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| AgentError::AgentNotFound(name.to_string()))?;

        let id = (name.to_string(), key.to_string());
        {
            let instances = self.instances.read().await;
            if let Some(handle) = instances.get(&id) {
                if !handle.is_closed() {
                    return Ok(handle.clone());
                }
            }
        }

        let mut instances = self.instances.write().await;
        if let Some(handle) = instances.get(&id) {
            if !handle.is_closed() {
                return Ok(handle.clone());
            }
            tracing::warn!(agent = name, key, "instance stopped, recreating");
        }

        let agent = factory(AgentContext {
            llm: Arc::clone(&self.llm),
            settings: self.settings.clone(),
            key: key.to_string(),
        });
        let handle = AgentHandle::spawn(
            format!("{}/{}", name, key),
            agent,
            self.settings.mailbox_capacity,
            Duration::from_secs(self.settings.request_timeout_secs),
        );
        instances.insert(id, handle.clone());
        Ok(handle)
    }
}
