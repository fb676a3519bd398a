use crate::core::models::ProxyConfig;
use crate::proxy::{ProxyError, UpstreamClient};
use std::sync::Arc;

/// 应用状态
///
/// 启动时构建一次, 之后只读; 请求之间不共享可变状态
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let upstream = UpstreamClient::new(&config)?;
        tracing::info!(
            "Backend: {} (timeout {}s, embeddings: {:?}, credential: {})",
            upstream.base_url(),
            upstream.timeout().as_secs(),
            config.embedding_mode,
            config.credential().label()
        );

        Ok(Self {
            config: Arc::new(config),
            upstream: Arc::new(upstream),
        })
    }
}
