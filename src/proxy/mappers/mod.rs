// Mappers 模块 - 协议转换器

pub mod aleph_alpha; // 请求转换 (OpenAI → Aleph Alpha)
pub mod error_classifier;
pub mod openai; // 响应转换 (Aleph Alpha → OpenAI)
pub mod streaming;
