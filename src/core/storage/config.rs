//! 配置加载服务
//! 启动时从 JSON 文件读取一次, 校验后不再变化

use crate::core::models::AppConfig;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件失败 {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid backend base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("request_timeout must be greater than zero")]
    ZeroTimeout,
}

/// 配置存储服务
pub struct ConfigStorage;

impl ConfigStorage {
    /// 加载应用配置, 文件不存在时使用默认值
    pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
        let Some(path) = path else {
            return Ok(AppConfig::default());
        };

        let path_str = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path_str.clone(),
            source,
        })?;
        let config: AppConfig = serde_json::from_str(&content).map_err(|source| {
            ConfigError::Parse {
                path: path_str.clone(),
                source,
            }
        })?;

        tracing::info!("Loaded config from {}", path_str);
        Ok(config)
    }

    /// 校验并规范化配置
    pub fn validate(mut config: AppConfig) -> Result<AppConfig, ConfigError> {
        let base = config.proxy.backend_base_url.trim().to_string();
        let parsed = url::Url::parse(&base).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: base,
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        config.proxy.backend_base_url = base.trim_end_matches('/').to_string();

        if config.proxy.request_timeout == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        if config
            .proxy
            .backend_token
            .as_deref()
            .is_some_and(|t| t.trim().is_empty())
        {
            config.proxy.backend_token = None;
        }

        Ok(config)
    }
}
