// Aleph Alpha → OpenAI 响应转换
use super::models::*;
use crate::proxy::error::ProxyError;
use crate::proxy::mappers::aleph_alpha::models::{
    AaFinishReason, CompleteResponse, EmbedResponse, ModelInfo, SemanticEmbedResponse,
};

pub const MODEL_OWNER: &str = "aleph-alpha";

/// finish_reason 映射, 未知值直接报错而不是猜测
pub fn map_finish_reason(code: Option<&str>) -> Result<FinishReason, ProxyError> {
    match code.and_then(AaFinishReason::parse) {
        Some(AaFinishReason::EndOfText) => Ok(FinishReason::Stop),
        Some(AaFinishReason::MaximumTokens) => Ok(FinishReason::Length),
        None => Err(ProxyError::Mapping(format!(
            "Unknown finish reason: {}",
            code.unwrap_or("null")
        ))),
    }
}

pub fn transform_completion_response(
    response: CompleteResponse,
    model: &str,
) -> Result<Completion, ProxyError> {
    if response.completions.is_empty() {
        return Err(ProxyError::Mapping(
            "backend returned no completions".to_string(),
        ));
    }

    let choices = response
        .completions
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            let text = result.completion.ok_or_else(|| {
                ProxyError::Mapping(format!("completion {} has no text", index))
            })?;
            Ok(CompletionChoice {
                index: index as u32,
                text,
                finish_reason: map_finish_reason(result.finish_reason.as_deref())?,
                logprobs: None,
            })
        })
        .collect::<Result<Vec<_>, ProxyError>>()?;

    let usage = match (response.num_tokens_prompt_total, response.num_tokens_generated) {
        (Some(prompt), Some(generated)) => Some(CompletionUsage {
            prompt_tokens: prompt,
            completion_tokens: generated,
            total_tokens: prompt
                .checked_add(generated)
                .unwrap_or(UNKNOWN_TOKEN_COUNT),
        }),
        _ => None,
    };

    Ok(Completion {
        id: String::new(),
        object: "text_completion".to_string(),
        created: 0,
        model: model.to_string(),
        choices,
        usage,
    })
}

/// 单个子请求的 embedding 结果
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector {
    pub embedding: Vec<f32>,
    pub prompt_tokens: Option<i64>,
}

impl TryFrom<EmbedResponse> for EmbeddingVector {
    type Error = ProxyError;

    fn try_from(response: EmbedResponse) -> Result<Self, Self::Error> {
        // 只请求了一个 layer 和一种 pooling, 取第一个即可
        let embedding = response
            .embeddings
            .into_values()
            .next()
            .and_then(|poolings| poolings.into_values().next())
            .ok_or_else(|| {
                ProxyError::Mapping("backend returned no embedding vector".to_string())
            })?;
        Ok(Self {
            embedding,
            prompt_tokens: response.num_tokens_prompt_total,
        })
    }
}

impl From<SemanticEmbedResponse> for EmbeddingVector {
    fn from(response: SemanticEmbedResponse) -> Self {
        Self {
            embedding: response.embedding,
            prompt_tokens: response.num_tokens_prompt_total,
        }
    }
}

/// 按输入顺序编号 0..n-1; 任一子响应缺少 token 数时 usage 记为 -1
pub fn transform_embedding_response(
    vectors: Vec<EmbeddingVector>,
    model: &str,
) -> CreateEmbeddingResponse {
    // 溢出与缺失同样视为未知
    let prompt_tokens = vectors
        .iter()
        .try_fold(0i64, |total, v| v.prompt_tokens.and_then(|n| total.checked_add(n)));

    let usage = match prompt_tokens {
        Some(tokens) => EmbeddingUsage {
            prompt_tokens: tokens,
            total_tokens: tokens,
        },
        None => EmbeddingUsage::unknown(),
    };

    let data = vectors
        .into_iter()
        .enumerate()
        .map(|(index, v)| Embedding {
            object: "embedding".to_string(),
            embedding: v.embedding,
            index: index as u32,
        })
        .collect();

    CreateEmbeddingResponse {
        object: "list".to_string(),
        model: model.to_string(),
        data,
        usage,
    }
}

pub fn transform_models_response(models: Vec<ModelInfo>) -> ModelList {
    ModelList {
        object: "list".to_string(),
        data: models
            .into_iter()
            .map(|m| ModelObject {
                id: m.name,
                object: "model".to_string(),
                created: 0,
                owned_by: MODEL_OWNER.to_string(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_response(value: serde_json::Value) -> CompleteResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_transform_completion_response() {
        let resp = complete_response(json!({
            "completions": [{"completion": "Berlin", "finish_reason": "end_of_text"}]
        }));
        let result = transform_completion_response(resp, "luminous-base").unwrap();
        let body = serde_json::to_value(&result).unwrap();
        assert_eq!(body["choices"][0]["index"], 0);
        assert_eq!(body["choices"][0]["text"], "Berlin");
        assert_eq!(body["choices"][0]["finish_reason"], "stop");
        assert_eq!(body["object"], "text_completion");
        assert_eq!(body["model"], "luminous-base");
        assert!(body.get("usage").is_none());
    }

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(map_finish_reason(Some("end_of_text")).unwrap(), FinishReason::Stop);
        assert_eq!(
            map_finish_reason(Some("maximum_tokens")).unwrap(),
            FinishReason::Length
        );
        assert!(matches!(
            map_finish_reason(Some("stop_sequence_reached")),
            Err(ProxyError::Mapping(_))
        ));
        assert!(matches!(map_finish_reason(None), Err(ProxyError::Mapping(_))));
    }

    #[test]
    fn test_multiple_completions_indexed() {
        let resp = complete_response(json!({
            "completions": [
                {"completion": "a", "finish_reason": "end_of_text"},
                {"completion": "b", "finish_reason": "maximum_tokens"}
            ],
            "num_tokens_prompt_total": 4,
            "num_tokens_generated": 6
        }));
        let result = transform_completion_response(resp, "m").unwrap();
        assert_eq!(result.choices.len(), 2);
        assert_eq!(result.choices[1].index, 1);
        assert_eq!(result.choices[1].finish_reason, FinishReason::Length);
        assert_eq!(result.usage.unwrap().total_tokens, 10);
    }

    #[test]
    fn test_unknown_finish_reason_fails_whole_response() {
        let resp = complete_response(json!({
            "completions": [{"completion": "x", "finish_reason": "content_filter"}]
        }));
        assert!(transform_completion_response(resp, "m").is_err());

        let resp = complete_response(json!({"completions": []}));
        assert!(transform_completion_response(resp, "m").is_err());
    }

    #[test]
    fn test_embedding_indices_and_sentinel_usage() {
        let vectors = vec![
            EmbeddingVector { embedding: vec![0.1], prompt_tokens: Some(2) },
            EmbeddingVector { embedding: vec![0.2], prompt_tokens: None },
        ];
        let result = transform_embedding_response(vectors, "luminous-base");
        assert_eq!(result.data.len(), 2);
        assert_eq!(result.data[0].index, 0);
        assert_eq!(result.data[1].index, 1);
        assert_eq!(result.data[1].embedding, vec![0.2]);
        assert_eq!(result.usage, EmbeddingUsage::unknown());
    }

    #[test]
    fn test_embedding_usage_summed() {
        let vectors = vec![
            EmbeddingVector { embedding: vec![0.1], prompt_tokens: Some(2) },
            EmbeddingVector { embedding: vec![0.2], prompt_tokens: Some(3) },
        ];
        let result = transform_embedding_response(vectors, "m");
        assert_eq!(result.usage.prompt_tokens, 5);
        assert_eq!(result.usage.total_tokens, 5);
    }

    #[test]
    fn test_token_count_overflow_is_unknown() {
        let vectors = vec![
            EmbeddingVector { embedding: vec![0.1], prompt_tokens: Some(i64::MAX) },
            EmbeddingVector { embedding: vec![0.2], prompt_tokens: Some(1) },
        ];
        let result = transform_embedding_response(vectors, "m");
        assert_eq!(result.usage, EmbeddingUsage::unknown());

        let resp = complete_response(json!({
            "completions": [{"completion": "x", "finish_reason": "end_of_text"}],
            "num_tokens_prompt_total": i64::MAX,
            "num_tokens_generated": 1
        }));
        let usage = transform_completion_response(resp, "m").unwrap().usage.unwrap();
        assert_eq!(usage.prompt_tokens, i64::MAX);
        assert_eq!(usage.total_tokens, UNKNOWN_TOKEN_COUNT);
    }

    #[test]
    fn test_embed_response_first_vector() {
        let resp: EmbedResponse = serde_json::from_value(json!({
            "model_version": "2021-12",
            "embeddings": {"layer_40": {"last_token": [0.1, 0.2, 0.3]}},
            "num_tokens_prompt_total": 1
        }))
        .unwrap();
        let vector = EmbeddingVector::try_from(resp).unwrap();
        assert_eq!(vector.embedding, vec![0.1, 0.2, 0.3]);
        assert_eq!(vector.prompt_tokens, Some(1));

        let empty: EmbedResponse =
            serde_json::from_value(json!({"embeddings": {}})).unwrap();
        assert!(EmbeddingVector::try_from(empty).is_err());
    }

    #[test]
    fn test_models_list() {
        let models: Vec<ModelInfo> = serde_json::from_value(json!([
            {"name": "luminous-base", "description": "base", "max_context_size": 2048},
            {"name": "luminous-extended"}
        ]))
        .unwrap();
        let list = transform_models_response(models);
        assert_eq!(list.object, "list");
        assert_eq!(list.data[0].id, "luminous-base");
        assert_eq!(list.data[1].owned_by, "aleph-alpha");
    }
}
