//! 反代路由定义

use crate::api::common;
use crate::proxy::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// 构建反代路由
pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // OpenAI
        .route(
            "/v1/chat/completions",
            post(handlers::openai::handle_chat_completions),
        )
        .route("/v1/completions", post(handlers::openai::handle_completions))
        .route("/v1/embeddings", post(handlers::openai::handle_embeddings))
        .route("/v1/models", get(handlers::openai::handle_list_models))
        // 健康检查
        .route("/healthz", get(common::health_check))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(common::request_logger))
}
