// 工具函数
use crate::core::models::BackendCredential;
use crate::proxy::error::ProxyError;
use axum::http::{header, HeaderMap, HeaderValue};

/// 由传输层自行计算的请求头, 以及逐跳 (hop-by-hop) 头
const TRANSPORT_OWNED_HEADERS: [header::HeaderName; 8] = [
    header::CONTENT_LENGTH,
    header::HOST,
    header::ACCEPT_ENCODING,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::TE,
    header::UPGRADE,
    header::PROXY_AUTHORIZATION,
];

/// 准备转发到后端的请求头
///
/// 除传输层负责的头之外原样透传; Authorization 按凭证策略处理:
/// 服务端 token 与客户端 token 互斥, 绝不同时发送
pub fn prepare_headers(
    inbound: &HeaderMap,
    credential: &BackendCredential,
) -> Result<HeaderMap, ProxyError> {
    let mut headers = inbound.clone();
    for name in TRANSPORT_OWNED_HEADERS.iter() {
        headers.remove(name);
    }

    if let BackendCredential::ServerHeld(token) = credential {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ProxyError::Internal(format!("invalid backend token: {}", e)))?;
        headers.insert(header::AUTHORIZATION, value);
    }

    Ok(headers)
}

/// 请求体转换后的 JSON 头
pub fn with_json_content_type(mut headers: HeaderMap) -> HeaderMap {
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers
}
