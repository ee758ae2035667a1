//! 规则求值引擎
//!
//! `JsonLogic` 持有自定义规则注册表与日志输出。求值分两层：
//!
//! - `evaluate`：顶层入口，操作符错误（未知操作符、参数无效、长度未定义、注册表错误）直接返回给调用方
//! - `resolve_value`：嵌套操作数的解析，失败时降级为 null（内联比较简写降级为 false），不向上传播
//!
//! 降级点都集中在 `resolve_value` 一处，并记录 debug 日志。

use crate::error::{Result, RuleError};
use crate::models::RuleNode;
use crate::operators::{self, comparison, normalize, variable, Operator};
use crate::registry::RuleRegistry;
use crate::sink::{LogSink, TracingSink};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// 规则求值引擎
#[derive(Clone)]
pub struct JsonLogic {
    registry: Arc<RuleRegistry>,
    log_sink: Arc<dyn LogSink>,
}

impl JsonLogic {
    /// 使用空注册表和 tracing 日志输出创建引擎
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RuleRegistry::new()),
            log_sink: Arc::new(TracingSink),
        }
    }

    /// 使用外部构建的注册表
    pub fn with_registry(mut self, registry: Arc<RuleRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// 替换 `log` 操作符的输出
    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = sink;
        self
    }

    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    /// 对数据上下文求值规则
    ///
    /// - `null`、空对象、空数组：`false`
    /// - 其他标量：原样返回
    /// - 操作节点：分发到操作符，错误向上传播
    /// - 数组：逐元素解析，返回列表
    #[instrument(level = "trace", skip_all)]
    pub fn evaluate(&self, rule: &Value, data: &Value) -> Result<Value> {
        match rule {
            Value::Null => Ok(Value::Bool(false)),
            Value::Array(items) if items.is_empty() => Ok(Value::Bool(false)),
            Value::Object(map) if map.is_empty() => Ok(Value::Bool(false)),
            Value::Array(_) | Value::Object(_) => self.apply_rule(rule, data),
            scalar => Ok(scalar.clone()),
        }
    }

    fn apply_rule(&self, rule: &Value, data: &Value) -> Result<Value> {
        match RuleNode::classify(rule) {
            RuleNode::Operation { operator, operand } => {
                self.apply_operator(operator, operand, data)
            }
            RuleNode::Literal(Value::Array(items)) => Ok(Value::Array(
                items
                    .iter()
                    .map(|item| self.resolve_value(item, data))
                    .collect(),
            )),
            RuleNode::Literal(other) => self.try_resolve(other, data),
        }
    }

    /// 解析规则节点为具体值，内部错误降级为 null
    pub fn resolve_value(&self, value: &Value, data: &Value) -> Value {
        match self.try_resolve(value, data) {
            Ok(resolved) => resolved,
            Err(e) => {
                debug!(error = %e, "子规则求值失败，降级为 null");
                Value::Null
            }
        }
    }

    fn try_resolve(&self, value: &Value, data: &Value) -> Result<Value> {
        if let RuleNode::Operation { operator, operand } = RuleNode::classify(value) {
            return self.apply_operator(operator, operand, data);
        }

        match value {
            Value::Array(items) => {
                if let Some((op, operands)) = comparison_shorthand(items) {
                    let resolved = operands
                        .iter()
                        .map(|operand| self.resolve_value(operand, data))
                        .collect();
                    return Ok(Value::Bool(comparison::compare_values(op, resolved)));
                }
                Ok(Value::Array(
                    items
                        .iter()
                        .map(|item| self.resolve_value(item, data))
                        .collect(),
                ))
            }
            Value::Object(map) => Ok(Value::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), self.resolve_value(item, data)))
                    .collect(),
            )),
            scalar => Ok(scalar.clone()),
        }
    }

    /// 分发操作符：自定义规则优先于内置操作符
    fn apply_operator(&self, name: &str, operand: &Value, data: &Value) -> Result<Value> {
        if let Some(rule) = self.registry.get(name)? {
            let operands: Vec<Value> = normalize(operand)
                .iter()
                .map(|arg| self.resolve_value(arg, data))
                .collect();
            return rule.evaluate(&operands, data);
        }

        let op = Operator::from_name(name)
            .ok_or_else(|| RuleError::UnknownOperator(name.to_string()))?;

        if op.takes_raw_operand() {
            operators::apply_raw(self, op, operand, data)
        } else {
            operators::apply(self, op, &normalize(operand), data)
        }
    }

    /// 按变量路径取值，缺失时返回 `default`
    pub fn get_variable_value(&self, path: &Value, data: &Value, default: Value) -> Value {
        variable::lookup(self, path, data).unwrap_or(default)
    }

    pub(crate) fn emit_log(&self, value: &Value) {
        if let Err(e) = self.log_sink.log(value) {
            warn!(error = %e, "日志输出失败，已忽略");
        }
    }
}

impl Default for JsonLogic {
    fn default() -> Self {
        Self::new()
    }
}

/// `[op, [a, b, ...]]` 形式的内联比较
fn comparison_shorthand(items: &[Value]) -> Option<(Operator, &[Value])> {
    match items {
        [Value::String(symbol), Value::Array(operands)] => Operator::from_name(symbol)
            .filter(Operator::is_comparison)
            .map(|op| (op, operands.as_slice())),
        _ => None,
    }
}

/// 使用默认引擎求值
pub fn apply(rule: &Value, data: &Value) -> Result<Value> {
    JsonLogic::new().evaluate(rule, data)
}
