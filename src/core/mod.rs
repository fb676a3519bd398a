//! 核心模块
//! 配置模型与加载

pub mod models;
pub mod storage;
