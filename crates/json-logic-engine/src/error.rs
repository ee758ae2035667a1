//! 规则引擎错误类型
//!
//! 顶层求值会传播这里的错误；嵌套子规则在值解析阶段失败时会被降级为 null/false，
//! 不会出现在调用方。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("未知的操作符: {0}")]
    UnknownOperator(String),

    #[error("操作符 {operator} 参数无效: {reason}")]
    InvalidArguments { operator: String, reason: String },

    #[error("无法计算长度: {0} 类型没有定义长度")]
    UndefinedLength(String),

    #[error("自定义规则注册表错误: {0}")]
    Registry(#[from] RegistryError),

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl RuleError {
    pub(crate) fn invalid_arguments(operator: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            operator: operator.to_string(),
            reason: reason.into(),
        }
    }
}

/// 自定义规则注册表错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("无效的操作符名称: '{0}'")]
    InvalidName(String),

    #[error("操作符名称不一致: 注册为 '{registered}', 实例报告为 '{reported}'")]
    NameMismatch { registered: String, reported: String },

    #[error("自定义操作符未注册: {0}")]
    NotRegistered(String),
}

pub type Result<T> = std::result::Result<T, RuleError>;
