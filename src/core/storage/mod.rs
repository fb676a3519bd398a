//! 配置存储

mod config;

pub use config::{ConfigError, ConfigStorage};
