//! 可观测性模块
//!
//! 所有入口通过单一函数初始化日志，保证一致的过滤规则和输出格式。

pub mod tracing;

use crate::config::ObservabilityConfig;
use ::tracing::info;
use anyhow::Result;

/// 初始化可观测性
///
/// # Example
///
/// ```ignore
/// use json_logic_shared::config::AppConfig;
/// use json_logic_shared::observability;
///
/// fn main() -> anyhow::Result<()> {
///     let config = AppConfig::load("json-logic")?;
///     observability::init(&config.service_name, &config.observability)?;
///     Ok(())
/// }
/// ```
pub fn init(service_name: &str, config: &ObservabilityConfig) -> Result<()> {
    tracing::init(config)?;

    info!(
        service = %service_name,
        log_level = %config.log_level,
        log_format = %config.log_format,
        "Observability initialized"
    );
    Ok(())
}
