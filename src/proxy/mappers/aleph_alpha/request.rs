// OpenAI → Aleph Alpha 请求转换
use super::models::*;
use crate::core::models::{EmbeddingMode, ProxyConfig};
use crate::proxy::error::ProxyError;
use crate::proxy::mappers::openai::models::{
    ChatCompletionRequest, CompletionRequest, EmbeddingInput, EmbeddingRequest, InboundRequest,
    Prompt,
};
use serde_json::Value;

/// 后端 chat 接口不接受的字段
const UNSUPPORTED_CHAT_FIELDS: [&str; 2] = ["n", "top_p"];

/// 后端 complete 请求中由翻译结果占用的字段, 透传的额外字段不得覆盖
const COMPLETE_OWNED_FIELDS: [&str; 13] = [
    "model",
    "prompt",
    "maximum_tokens",
    "temperature",
    "top_p",
    "presence_penalty",
    "frequency_penalty",
    "best_of",
    "n",
    "log_probs",
    "stop_sequences",
    "echo",
    "stream",
];

/// 按请求种类转换为后端请求, 纯函数 (只读取配置)
pub fn transform_request(
    request: InboundRequest,
    config: &ProxyConfig,
) -> Result<BackendRequest, ProxyError> {
    match request {
        InboundRequest::Chat(req) => Ok(transform_chat_request(req, config)),
        InboundRequest::Completion(req) => {
            transform_completion_request(req).map(BackendRequest::Complete)
        }
        InboundRequest::Embedding(req) => {
            transform_embedding_request(req, config.embedding_mode).map(BackendRequest::Embed)
        }
    }
}

/// 解析 chat 请求体, 必须是 JSON 对象
pub fn parse_chat_request(body: Value) -> Result<ChatCompletionRequest, ProxyError> {
    match body {
        Value::Object(body) => Ok(ChatCompletionRequest { body }),
        other => Err(ProxyError::InvalidBody(format!(
            "chat request must be a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

pub fn transform_chat_request(request: ChatCompletionRequest, config: &ProxyConfig) -> BackendRequest {
    let stream = request.stream();
    let mut body = request.body;

    for field in UNSUPPORTED_CHAT_FIELDS {
        body.remove(field);
    }

    if !body.contains_key("model") {
        if let Some(model) = &config.default_chat_model {
            body.insert("model".to_string(), Value::String(model.clone()));
        }
    }

    BackendRequest::Chat {
        body: Value::Object(body),
        stream,
    }
}

pub fn transform_completion_request(
    request: CompletionRequest,
) -> Result<CompleteRequest, ProxyError> {
    let prompt = match request.prompt {
        Prompt::Text(text) => text,
        Prompt::TextList(_) | Prompt::Tokens(_) | Prompt::TokenLists(_) => {
            return Err(ProxyError::UnsupportedInput(
                "lists of prompts are currently not supported, prompt must be a string"
                    .to_string(),
            ))
        }
    };

    let mut extra = request.extra;
    extra.retain(|key, _| {
        let owned = COMPLETE_OWNED_FIELDS.contains(&key.as_str());
        if owned {
            tracing::debug!("Dropping clashing client field '{}'", key);
        }
        !owned
    });

    tracing::debug!(
        "Completion request: model='{}', max_tokens={:?}, n={:?}",
        request.model,
        request.max_tokens,
        request.n
    );

    Ok(CompleteRequest {
        model: request.model,
        prompt,
        maximum_tokens: request.max_tokens,
        temperature: request.temperature,
        top_p: request.top_p,
        presence_penalty: request.presence_penalty,
        frequency_penalty: request.frequency_penalty,
        best_of: request.best_of,
        n: request.n.unwrap_or(1),
        log_probs: request.logprobs,
        stop_sequences: request.stop.map(|s| s.into_vec()),
        echo: request.echo.unwrap_or(false),
        stream: request.stream.unwrap_or(false),
        extra,
    })
}

pub fn transform_embedding_request(
    request: EmbeddingRequest,
    mode: EmbeddingMode,
) -> Result<Vec<EmbeddingJob>, ProxyError> {
    if let Some(format) = request.encoding_format.as_deref() {
        if format != "float" {
            return Err(ProxyError::UnsupportedInput(format!(
                "encoding_format '{}' is not supported, use 'float'",
                format
            )));
        }
    }

    let inputs = match request.input {
        EmbeddingInput::Text(text) => vec![text],
        EmbeddingInput::TextList(list) => list,
        EmbeddingInput::Tokens(_) | EmbeddingInput::TokenLists(_) => {
            return Err(ProxyError::UnsupportedInput(
                "token arrays are not supported, input must be a string or a list of strings"
                    .to_string(),
            ))
        }
    };

    if inputs.is_empty() {
        return Err(ProxyError::UnsupportedInput(
            "input must contain at least one string".to_string(),
        ));
    }

    let model = request.model;
    Ok(inputs
        .into_iter()
        .map(|prompt| match mode {
            EmbeddingMode::Semantic => EmbeddingJob::Semantic(SemanticEmbedRequest {
                model: model.clone(),
                prompt,
                representation: SemanticRepresentation::Document,
            }),
            EmbeddingMode::Regular => EmbeddingJob::Regular(EmbedRequest {
                model: model.clone(),
                prompt,
                layers: vec![LAST_LAYER],
                pooling: vec![LAST_TOKEN_POOLING.to_string()],
            }),
        })
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completion(body: Value) -> CompletionRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_max_tokens_renamed() {
        let req = completion(json!({
            "model": "m",
            "prompt": "Capital of Germany?",
            "max_tokens": 50
        }));
        let body = serde_json::to_value(transform_completion_request(req).unwrap()).unwrap();
        assert_eq!(body["maximum_tokens"], 50);
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["prompt"], "Capital of Germany?");
        assert_eq!(body["model"], "m");
    }

    #[test]
    fn test_renames_and_defaults() {
        let req = completion(json!({
            "model": "luminous-base-control",
            "prompt": "Hi",
            "stop": "\n",
            "logprobs": 2,
            "temperature": 0.6,
            "best_of": 3,
            "presence_penalty": 0.5
        }));
        let body = serde_json::to_value(transform_completion_request(req).unwrap()).unwrap();
        assert_eq!(body["stop_sequences"], json!(["\n"]));
        assert_eq!(body["log_probs"], 2);
        assert_eq!(body["temperature"], 0.6);
        assert_eq!(body["best_of"], 3);
        assert_eq!(body["presence_penalty"], 0.5);
        assert_eq!(body["echo"], false);
        assert_eq!(body["n"], 1);
        assert!(body.get("stop").is_none());
        assert!(body.get("logprobs").is_none());
        // 未设置的参数不补默认值
        assert!(body.get("top_p").is_none());
        assert!(body.get("frequency_penalty").is_none());
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn test_null_stream_treated_as_false() {
        let req = completion(json!({"model": "m", "prompt": "p", "stream": null}));
        assert_eq!(req.stream, None);
        let out = transform_completion_request(req).unwrap();
        assert!(!out.stream);
        let body = serde_json::to_value(out).unwrap();
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn test_unmodelled_fields_forwarded_unchanged() {
        let req = completion(json!({
            "model": "m",
            "prompt": "p",
            "user": "u1",
            "top_k": 5,
            "maximum_tokens": 7
        }));
        let body = serde_json::to_value(transform_completion_request(req).unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "m",
                "prompt": "p",
                "n": 1,
                "echo": false,
                "user": "u1",
                "top_k": 5
            })
        );
    }

    #[test]
    fn test_stop_list_kept() {
        let req = completion(json!({"model": "m", "prompt": "x", "stop": ["a", "b"]}));
        let out = transform_completion_request(req).unwrap();
        assert_eq!(out.stop_sequences, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_prompt_list_rejected() {
        let req = completion(json!({"model": "m", "prompt": ["a", "b"]}));
        assert!(matches!(
            transform_completion_request(req),
            Err(ProxyError::UnsupportedInput(_))
        ));

        let req = completion(json!({"model": "m", "prompt": [1, 2, 3]}));
        assert!(matches!(
            transform_completion_request(req),
            Err(ProxyError::UnsupportedInput(_))
        ));
    }

    #[test]
    fn test_translation_is_deterministic() {
        let raw = json!({
            "model": "m",
            "prompt": "p",
            "max_tokens": 10,
            "temperature": 0.2,
            "stop": "x"
        });
        let first = transform_completion_request(completion(raw.clone())).unwrap();
        let second = transform_completion_request(completion(raw)).unwrap();
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_embedding_single_string() {
        let req: EmbeddingRequest =
            serde_json::from_value(json!({"model": "luminous-base", "input": "Apple"})).unwrap();
        let jobs = transform_embedding_request(req, EmbeddingMode::Regular).unwrap();
        assert_eq!(jobs.len(), 1);
        match &jobs[0] {
            EmbeddingJob::Regular(r) => {
                assert_eq!(r.prompt, "Apple");
                assert_eq!(r.layers, vec![-1]);
                assert_eq!(r.pooling, vec!["last_token".to_string()]);
            }
            other => panic!("unexpected job: {:?}", other),
        }
    }

    #[test]
    fn test_embedding_semantic_keeps_order() {
        let req: EmbeddingRequest = serde_json::from_value(
            json!({"model": "luminous-base", "input": ["Apple", "Banana", "Cherry"]}),
        )
        .unwrap();
        let jobs = transform_embedding_request(req, EmbeddingMode::Semantic).unwrap();
        let prompts: Vec<_> = jobs
            .iter()
            .map(|job| match job {
                EmbeddingJob::Semantic(r) => {
                    assert_eq!(r.representation, SemanticRepresentation::Document);
                    r.prompt.as_str()
                }
                EmbeddingJob::Regular(_) => panic!("expected semantic job"),
            })
            .collect();
        assert_eq!(prompts, vec!["Apple", "Banana", "Cherry"]);
    }

    #[test]
    fn test_embedding_rejects_empty_and_tokens() {
        let req: EmbeddingRequest =
            serde_json::from_value(json!({"model": "m", "input": []})).unwrap();
        assert!(transform_embedding_request(req, EmbeddingMode::Regular).is_err());

        let req: EmbeddingRequest =
            serde_json::from_value(json!({"model": "m", "input": [[1, 2], [3]]})).unwrap();
        assert!(transform_embedding_request(req, EmbeddingMode::Regular).is_err());

        let req: EmbeddingRequest = serde_json::from_value(
            json!({"model": "m", "input": "x", "encoding_format": "base64"}),
        )
        .unwrap();
        assert!(transform_embedding_request(req, EmbeddingMode::Regular).is_err());
    }

    #[test]
    fn test_chat_strips_unsupported_fields() {
        let req = parse_chat_request(json!({
            "model": "luminous-base-control",
            "messages": [{"role": "user", "content": "Hello"}],
            "n": 2,
            "top_p": 0.9,
            "stream": true
        }))
        .unwrap();
        match transform_chat_request(req, &ProxyConfig::default()) {
            BackendRequest::Chat { body, stream } => {
                assert!(stream);
                assert!(body.get("n").is_none());
                assert!(body.get("top_p").is_none());
                assert_eq!(body["messages"][0]["content"], "Hello");
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_chat_default_model() {
        let mut config = ProxyConfig::default();
        config.default_chat_model = Some("llama-3.1-8b-instruct".to_string());
        let req = parse_chat_request(json!({"messages": []})).unwrap();
        let translated = transform_request(InboundRequest::Chat(req), &config).unwrap();
        let BackendRequest::Chat { body, stream } = translated else {
            panic!("expected chat request");
        };
        assert!(!stream);
        assert_eq!(body["model"], "llama-3.1-8b-instruct");
    }

    #[test]
    fn test_chat_rejects_non_object() {
        assert!(matches!(
            parse_chat_request(json!([1, 2])),
            Err(ProxyError::InvalidBody(_))
        ));
    }
}
