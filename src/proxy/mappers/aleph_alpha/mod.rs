// Aleph Alpha 后端 schema 与请求转换

pub mod models;
pub mod request;

pub use models::*;
pub use request::*;
