// 上游客户端 - 对后端的单次调用 (无重试)
use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::core::models::ProxyConfig;
use crate::proxy::error::ProxyError;
use crate::proxy::mappers::error_classifier::classify_upstream_error;

/// 后端原始字节流, 单次消费
pub type ByteStream = BoxStream<'static, Result<Bytes, reqwest::Error>>;

/// 上游响应: 缓冲或流式
pub enum UpstreamResponse {
    Buffered { status: StatusCode, body: Bytes },
    Stream(ByteStream),
}

impl std::fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamResponse::Buffered { status, body } => f
                .debug_struct("Buffered")
                .field("status", status)
                .field("len", &body.len())
                .finish(),
            UpstreamResponse::Stream(_) => f.write_str("Stream"),
        }
    }
}

impl UpstreamResponse {
    /// 解析缓冲响应体
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ProxyError> {
        match self {
            UpstreamResponse::Buffered { body, .. } => serde_json::from_slice(&body)
                .map_err(|e| ProxyError::Mapping(format!("invalid backend JSON: {}", e))),
            UpstreamResponse::Stream(_) => Err(ProxyError::Internal(
                "expected a buffered backend response".to_string(),
            )),
        }
    }
}

pub struct UpstreamClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
    nice: bool,
}

impl UpstreamClient {
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        let timeout = config.timeout();
        // 超时覆盖连接与完整传输
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProxyError::Internal(format!("backend http client error: {}", e)))?;

        Ok(Self {
            base_url: config.backend_base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
            nice: config.nice,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 发起一次后端调用
    ///
    /// 非 2xx 状态一律返回 `ProxyError::Upstream`, 流式模式下也在首个字节转发前检查
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
        streaming: bool,
    ) -> Result<UpstreamResponse, ProxyError> {
        let url = self.url(path);
        tracing::debug!("Upstream {} {} (stream={})", method, url, streaming);

        let mut req = self.client.request(method, &url).headers(headers);
        if self.nice {
            req = req.query(&[("nice", "true")]);
        }
        if let Some(body) = body {
            req = req.body(body);
        }

        let response = req.send().await.map_err(classify_upstream_error)?;
        let status = response.status();

        if !status.is_success() {
            let text = error_body_text(path, response.text().await);
            tracing::warn!("Upstream {} returned {}: {}", path, status.as_u16(), text);
            return Err(ProxyError::Upstream { status, body: text });
        }

        if streaming {
            return Ok(UpstreamResponse::Stream(response.bytes_stream().boxed()));
        }

        let body = response.bytes().await.map_err(classify_upstream_error)?;
        Ok(UpstreamResponse::Buffered { status, body })
    }

    /// POST 一个 JSON 请求并解析 JSON 响应
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: HeaderMap,
        payload: &impl serde::Serialize,
    ) -> Result<T, ProxyError> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| ProxyError::Internal(format!("serialize backend request: {}", e)))?;
        self.call(Method::POST, path, headers, Some(Bytes::from(body)), false)
            .await?
            .json()
    }

    /// GET 并解析 JSON 响应
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: HeaderMap,
    ) -> Result<T, ProxyError> {
        self.call(Method::GET, path, headers, None, false)
            .await?
            .json()
    }
}

/// 读取错误响应体; 读取失败时记录原因, detail 退化为空串
fn error_body_text(path: &str, text: Result<String, reqwest::Error>) -> String {
    text.unwrap_or_else(|e| {
        tracing::warn!("Failed to read error body from upstream {}: {}", path, e);
        String::new()
    })
}
