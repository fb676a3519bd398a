//! Web 服务器

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;

use super::routes;
use crate::core::models::AppConfig;
use crate::state::AppState;

/// Web 服务器
pub struct WebServer {
    addr: SocketAddr,
    state: Arc<AppState>,
}

impl WebServer {
    /// 创建新的 Web 服务器
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
            .parse()
            .with_context(|| format!("无效的地址: {}:{}", config.bind_address, config.port))?;
        let state = AppState::new(config.proxy).context("初始化上游客户端失败")?;
        Ok(Self {
            addr,
            state: Arc::new(state),
        })
    }

    /// 启动服务器, Ctrl+C 时优雅退出
    pub async fn run(self) -> anyhow::Result<()> {
        let app = routes::build_routes(self.state.clone());

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("绑定端口失败: {}", self.addr))?;
        tracing::info!("Server listening on {}", self.addr);

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("服务器错误")?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
