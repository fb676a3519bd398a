// 错误分类模块 - 将底层传输错误转换为代理错误
use crate::proxy::error::ProxyError;
use reqwest::Error;

/// 分类传输错误并返回错误类型与英文消息
///
/// 返回值: (错误类型, 英文错误消息)
/// - 错误类型: 用于日志
/// - 英文消息: 描述性文本
pub fn classify_stream_error(error: &Error) -> (&'static str, &'static str) {
    if error.is_timeout() {
        ("timeout_error", "Backend did not finish within the request timeout")
    } else if error.is_connect() {
        ("connection_error", "Connection to backend failed")
    } else if error.is_decode() {
        ("decode_error", "Backend data could not be decoded")
    } else if error.is_body() {
        ("stream_error", "Backend stream was interrupted")
    } else {
        ("unknown_error", "Unknown transport error")
    }
}

/// 将请求阶段的 reqwest 错误映射为 ProxyError
pub fn classify_upstream_error(error: Error) -> ProxyError {
    let (kind, message) = classify_stream_error(&error);
    tracing::warn!("Backend request failed ({}): {}", kind, error);
    match kind {
        "timeout_error" => ProxyError::Timeout,
        "connection_error" => ProxyError::Connection(error.to_string()),
        "decode_error" => ProxyError::Mapping(format!("{}: {}", message, error)),
        _ => ProxyError::Connection(format!("{}: {}", message, error)),
    }
}
