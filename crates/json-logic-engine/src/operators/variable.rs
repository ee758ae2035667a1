//! 变量解析：`var` 与 `val`
//!
//! 查找结果用 `Option<Value>` 表示，`None` 即缺失标记，区别于存在但为 `null`/`""` 的值。
//! `missing`、`exists` 等操作符依赖这一区分。

use crate::coercion::is_blank;
use crate::error::Result;
use crate::evaluator::JsonLogic;
use crate::models::is_logic;
use crate::path::{get_path, key_text, walk};
use serde_json::Value;

/// `{"var": path}`，缺失时返回 null
pub(crate) fn var(engine: &JsonLogic, operand: &Value, data: &Value) -> Result<Value> {
    Ok(lookup(engine, operand, data).unwrap_or(Value::Null))
}

/// 按变量路径查找
///
/// - 空路径（`null`、`""`、`[]`）返回上下文本身
/// - `[key, default]`：key 未命中或为 `null`/`""` 时返回解析后的 default
/// - `[key]`：解包为 key
/// - 字符串/数字：直接键命中，否则按点号逐级下降
/// - 其他类型：缺失
pub(crate) fn lookup(engine: &JsonLogic, path: &Value, data: &Value) -> Option<Value> {
    if is_logic(path) {
        let resolved = engine.resolve_value(path, data);
        return lookup_plain(engine, &resolved, data);
    }
    lookup_plain(engine, path, data)
}

fn lookup_plain(engine: &JsonLogic, path: &Value, data: &Value) -> Option<Value> {
    match path {
        Value::Null => Some(data.clone()),
        Value::String(s) if s.is_empty() => Some(data.clone()),
        Value::Array(parts) => match parts.as_slice() {
            [] => Some(data.clone()),
            [single] => lookup(engine, single, data),
            [key, default] => match lookup(engine, key, data) {
                Some(found) if !is_blank(&found) => Some(found),
                _ => Some(engine.resolve_value(default, data)),
            },
            _ => None,
        },
        Value::String(_) | Value::Number(_) => {
            let key = key_text(path)?;
            get_path(data, &key).cloned()
        }
        _ => None,
    }
}

/// 判断路径是否存在，不做默认值回退
///
/// 字符串/数字按点号路径，数组按逐键路径；空路径总是存在。
pub(crate) fn exists(path: &Value, data: &Value) -> bool {
    match path {
        Value::Null => true,
        Value::String(s) if s.is_empty() => true,
        Value::Array(keys) => walk(data, keys).is_some(),
        other => key_text(other).is_some_and(|key| get_path(data, &key).is_some()),
    }
}

/// `{"val": key}` 或 `{"val": [k1, k2, ...]}`：逐键取值，不拆分点号，缺失返回 null
pub(crate) fn val(engine: &JsonLogic, operand: &Value, data: &Value) -> Result<Value> {
    let operand = resolve_if_logic(engine, operand, data);
    let keys: Vec<Value> = match operand {
        Value::Null => Vec::new(),
        Value::Array(parts) => parts
            .iter()
            .map(|part| resolve_if_logic(engine, part, data))
            .collect(),
        single => vec![single],
    };
    Ok(walk(data, &keys).cloned().unwrap_or(Value::Null))
}

fn resolve_if_logic(engine: &JsonLogic, value: &Value, data: &Value) -> Value {
    if is_logic(value) {
        engine.resolve_value(value, data)
    } else {
        value.clone()
    }
}
