// proxy 模块 - API 反代服务

pub mod common; // 公共工具
pub mod error;
pub mod handlers; // API 端点处理器
pub mod mappers; // 协议转换器
pub mod upstream; // 上游客户端

pub use error::ProxyError;
pub use upstream::UpstreamClient;
