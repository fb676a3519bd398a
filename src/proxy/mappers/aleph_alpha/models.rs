// Aleph Alpha 数据模型 (后端 schema)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const CHAT_PATH: &str = "/chat/completions";
pub const COMPLETE_PATH: &str = "/complete";
pub const EMBED_PATH: &str = "/embed";
pub const SEMANTIC_EMBED_PATH: &str = "/semantic_embed";
pub const MODELS_PATH: &str = "/models_available";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_of: Option<u32>,
    pub n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_probs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    pub echo: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub completion: Option<String>,
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub log_probs: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteResponse {
    pub model_version: Option<String>,
    pub completions: Vec<CompletionResult>,
    pub num_tokens_prompt_total: Option<i64>,
    pub num_tokens_generated: Option<i64>,
}

/// 后端 finish_reason 的封闭集合 (null 单独处理)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AaFinishReason {
    EndOfText,
    MaximumTokens,
}

impl AaFinishReason {
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "end_of_text" => Some(AaFinishReason::EndOfText),
            "maximum_tokens" => Some(AaFinishReason::MaximumTokens),
            _ => None,
        }
    }
}

pub const LAST_LAYER: i32 = -1;
pub const LAST_TOKEN_POOLING: &str = "last_token";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedRequest {
    pub model: String,
    pub prompt: String,
    pub layers: Vec<i32>,
    pub pooling: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub model_version: Option<String>,
    /// layer -> pooling -> vector
    pub embeddings: BTreeMap<String, BTreeMap<String, Vec<f32>>>,
    pub num_tokens_prompt_total: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticRepresentation {
    Symmetric,
    Document,
    Query,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticEmbedRequest {
    pub model: String,
    pub prompt: String,
    pub representation: SemanticRepresentation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticEmbedResponse {
    pub model_version: Option<String>,
    pub embedding: Vec<f32>,
    pub num_tokens_prompt_total: Option<i64>,
}

/// 一个 embedding 子请求, 每个输入字符串对应一个
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingJob {
    Regular(EmbedRequest),
    Semantic(SemanticEmbedRequest),
}

/// 后端请求, 与入站请求种类一一对应
#[derive(Debug, Clone, PartialEq)]
pub enum BackendRequest {
    Chat { body: Value, stream: bool },
    Complete(CompleteRequest),
    Embed(Vec<EmbeddingJob>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}
