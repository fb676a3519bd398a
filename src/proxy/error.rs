// 代理错误类型 - 统一转换为 {"detail": ...} 响应
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// 请求体不是合法 JSON 或缺少必需字段
    #[error("Invalid request: {0}")]
    InvalidBody(String),

    /// 形状合法但不受支持 (例如 prompt 列表)
    #[error("Unsupported input shape: {0}")]
    UnsupportedInput(String),

    /// 后端返回非 2xx, 原样携带状态码与响应体
    #[error("{body}")]
    Upstream { status: StatusCode, body: String },

    #[error("backend timeout")]
    Timeout,

    #[error("Backend connection failed: {0}")]
    Connection(String),

    /// 后端字段超出预期的封闭集合
    #[error("Unexpected backend response: {0}")]
    Mapping(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ProxyError::UnsupportedInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ProxyError::Upstream { status, .. } => *status,
            ProxyError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Connection(_) | ProxyError::Mapping(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Proxy error {}: {}", status.as_u16(), self);
        } else {
            tracing::warn!("Proxy error {}: {}", status.as_u16(), self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
