//! 应用配置模型

use super::ProxyConfig;
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,
    pub proxy: ProxyConfig,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            proxy: ProxyConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}
