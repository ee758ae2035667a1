//! 共享库
//!
//! 包含规则引擎各入口共用的配置加载与可观测性初始化。

pub mod config;
pub mod observability;
