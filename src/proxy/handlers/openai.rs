// OpenAI Handler
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};

use crate::proxy::common::utils::{prepare_headers, with_json_content_type};
use crate::proxy::error::ProxyError;
use crate::proxy::mappers::aleph_alpha::{
    parse_chat_request, transform_request, BackendRequest, CompleteResponse, EmbedResponse,
    EmbeddingJob, ModelInfo, SemanticEmbedResponse, CHAT_PATH, COMPLETE_PATH, EMBED_PATH,
    MODELS_PATH, SEMANTIC_EMBED_PATH,
};
use crate::proxy::mappers::openai::{
    transform_completion_response, transform_embedding_response, transform_models_response,
    EmbeddingVector, InboundRequest,
};
use crate::proxy::mappers::streaming::create_passthrough_stream;
use crate::proxy::upstream::{ByteStream, UpstreamClient, UpstreamResponse};
use crate::state::AppState;

pub async fn handle_chat_completions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let chat = parse_chat_request(parse_body(&body)?)?;
    forward(&state, &headers, InboundRequest::Chat(chat)).await
}

pub async fn handle_completions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let completion = parse_body(&body)?;
    forward(&state, &headers, InboundRequest::Completion(completion)).await
}

pub async fn handle_embeddings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let embedding = parse_body(&body)?;
    forward(&state, &headers, InboundRequest::Embedding(embedding)).await
}

pub async fn handle_list_models(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let upstream_headers = prepare_headers(&headers, &state.config.credential())?;
    let models: Vec<ModelInfo> = state.upstream.get_json(MODELS_PATH, upstream_headers).await?;
    debug!("Backend reports {} models", models.len());
    Ok(Json(transform_models_response(models)).into_response())
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ProxyError> {
    serde_json::from_slice(body).map_err(|e| ProxyError::InvalidBody(e.to_string()))
}

/// 翻译 → 转发 → 翻译; 校验失败时不会触达后端
async fn forward(
    state: &AppState,
    headers: &HeaderMap,
    request: InboundRequest,
) -> Result<Response, ProxyError> {
    let model = request.model().unwrap_or_default().to_string();
    let backend_request = transform_request(request, &state.config)?;
    let upstream_headers =
        with_json_content_type(prepare_headers(headers, &state.config.credential())?);
    let upstream = &state.upstream;

    match backend_request {
        BackendRequest::Chat { body, stream } => {
            info!("Chat completion: model='{}', stream={}", model, stream);
            let payload = to_payload(&body)?;
            match upstream
                .call(Method::POST, CHAT_PATH, upstream_headers, Some(payload), stream)
                .await?
            {
                UpstreamResponse::Stream(chunks) => event_stream_response(chunks, "chat"),
                UpstreamResponse::Buffered { body, .. } => json_bytes_response(body),
            }
        }
        BackendRequest::Complete(complete) if complete.stream => {
            info!("Completion: model='{}', stream=true", model);
            let payload = to_payload(&complete)?;
            match upstream
                .call(Method::POST, COMPLETE_PATH, upstream_headers, Some(payload), true)
                .await?
            {
                UpstreamResponse::Stream(chunks) => event_stream_response(chunks, "complete"),
                UpstreamResponse::Buffered { body, .. } => json_bytes_response(body),
            }
        }
        BackendRequest::Complete(complete) => {
            info!("Completion: model='{}', n={}", model, complete.n);
            let response: CompleteResponse = upstream
                .post_json(COMPLETE_PATH, upstream_headers, &complete)
                .await?;
            Ok(Json(transform_completion_response(response, &model)?).into_response())
        }
        BackendRequest::Embed(jobs) => {
            info!("Embeddings: model='{}', inputs={}", model, jobs.len());
            let vectors = try_join_all(
                jobs.into_iter()
                    .map(|job| embed(upstream, upstream_headers.clone(), job)),
            )
            .await?;
            Ok(Json(transform_embedding_response(vectors, &model)).into_response())
        }
    }
}

async fn embed(
    upstream: &UpstreamClient,
    headers: HeaderMap,
    job: EmbeddingJob,
) -> Result<EmbeddingVector, ProxyError> {
    match job {
        EmbeddingJob::Regular(req) => {
            let response: EmbedResponse = upstream.post_json(EMBED_PATH, headers, &req).await?;
            EmbeddingVector::try_from(response)
        }
        EmbeddingJob::Semantic(req) => {
            let response: SemanticEmbedResponse = upstream
                .post_json(SEMANTIC_EMBED_PATH, headers, &req)
                .await?;
            Ok(EmbeddingVector::from(response))
        }
    }
}

fn to_payload(value: &impl serde::Serialize) -> Result<Bytes, ProxyError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| ProxyError::Internal(format!("serialize backend request: {}", e)))
}

fn json_bytes_response(body: Bytes) -> Result<Response, ProxyError> {
    Response::builder()
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .map_err(|e| ProxyError::Internal(e.to_string()))
}

fn event_stream_response(chunks: ByteStream, label: &str) -> Result<Response, ProxyError> {
    let body = Body::from_stream(create_passthrough_stream(chunks, label.to_string()));
    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|e| ProxyError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::mappers::openai::CompletionRequest;
    use serde_json::Value;

    #[test]
    fn test_parse_body_reports_invalid_json() {
        let result: Result<Value, _> = parse_body(b"{not json");
        assert!(matches!(result, Err(ProxyError::InvalidBody(_))));

        let result: Result<CompletionRequest, _> = parse_body(br#"{"prompt": "x"}"#);
        assert!(matches!(result, Err(ProxyError::InvalidBody(_))));
    }
}
