//! `log` 操作符的日志输出

use serde_json::Value;
use thiserror::Error;
use tracing::info;

/// 日志输出失败
#[derive(Debug, Clone, Error)]
#[error("日志输出失败: {0}")]
pub struct SinkError(pub String);

/// 日志输出
///
/// 输出失败只会被记录，不会影响 `log` 操作符的返回值。
pub trait LogSink: Send + Sync {
    fn log(&self, value: &Value) -> Result<(), SinkError>;
}

/// 默认输出：写入 tracing 事件
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, value: &Value) -> Result<(), SinkError> {
        info!(target: "json_logic::log", value = %value, "rule log");
        Ok(())
    }
}
