//! 核心数据模型

mod config;
mod proxy_config;

pub use config::AppConfig;
pub use proxy_config::{BackendCredential, EmbeddingMode, ProxyConfig, DEFAULT_BACKEND_BASE_URL};
