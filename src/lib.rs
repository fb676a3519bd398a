//! OpenAI 兼容的 Aleph Alpha 反代服务
//!
//! 将 OpenAI 风格的 chat / completion / embedding 请求翻译为后端 schema,
//! 单次转发并把响应翻译回来; 流式响应原样透传

pub mod api;
pub mod core;
pub mod proxy;
pub mod state;
pub mod web;
