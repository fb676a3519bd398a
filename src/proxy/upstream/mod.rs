// 上游客户端模块
pub mod client;

pub use client::{ByteStream, UpstreamClient, UpstreamResponse};
