// OpenAI 客户端 schema 与响应转换

pub mod models;
pub mod response;

pub use models::*;
pub use response::*;
