//! 服务自身的辅助端点与中间件

pub mod common;
