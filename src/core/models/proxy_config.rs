//! 代理服务配置

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 默认后端地址
pub const DEFAULT_BACKEND_BASE_URL: &str = "https://api.aleph-alpha.com";

/// Embedding 模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingMode {
    /// 每个输入一个 semantic embedding (document representation)
    Semantic,
    /// 最后一层 last_token pooling
    #[default]
    Regular,
}

/// 后端凭证策略
///
/// 两种模式互斥: 要么使用服务端持有的 token, 要么透传客户端的 Authorization 头
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCredential {
    PassThrough,
    ServerHeld(String),
}

impl BackendCredential {
    /// 日志用标签, 不包含 token 本身
    pub fn label(&self) -> &'static str {
        match self {
            BackendCredential::PassThrough => "pass-through",
            BackendCredential::ServerHeld(_) => "server-held",
        }
    }
}

/// 反代服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// 后端 API 基础地址
    pub backend_base_url: String,

    /// 服务端持有的后端 token (设置后覆盖客户端凭证)
    pub backend_token: Option<String>,

    /// API 请求超时时间(秒)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Embedding 模式
    pub embedding_mode: EmbeddingMode,

    /// 请求未指定 model 时使用的 chat 模型
    pub default_chat_model: Option<String>,

    /// 以低优先级提交后端请求 (nice=true)
    pub nice: bool,
}

impl ProxyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn credential(&self) -> BackendCredential {
        match self.backend_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => BackendCredential::ServerHeld(token.to_string()),
            _ => BackendCredential::PassThrough,
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            backend_base_url: DEFAULT_BACKEND_BASE_URL.to_string(),
            backend_token: None,
            request_timeout: default_request_timeout(),
            embedding_mode: EmbeddingMode::default(),
            default_chat_model: None,
            nice: false,
        }
    }
}

fn default_request_timeout() -> u64 {
    120 // 默认 120 秒
}
