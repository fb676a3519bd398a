//! Web 服务器模块
//! 路由注册与监听

pub mod routes;
pub mod server;

pub use server::WebServer;
