//! 集合与工具操作符：`merge`、`in`、`keys`、`exists`、`length`、`get`、`??`、
//! `missing`、`missing_some`、`log`

use super::{resolve_all, variable, Operator};
use crate::coercion::{is_blank, loose_eq, to_number, to_text, type_name};
use crate::error::{Result, RuleError};
use crate::evaluator::JsonLogic;
use crate::path::{get_path, key_text, walk};
use serde_json::Value;

/// 展开一层：标量直接追加，数组拼接
pub(crate) fn merge(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let mut merged = Vec::new();
    for value in resolve_all(engine, args, data) {
        match value {
            Value::Array(items) => merged.extend(items),
            other => merged.push(other),
        }
    }
    Ok(Value::Array(merged))
}

/// `[needle, haystack]`：字符串子串检查或列表宽松相等成员检查
pub(crate) fn in_haystack(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let values = resolve_all(engine, args, data);
    let found = match values.as_slice() {
        [needle, Value::String(haystack), ..] => haystack.contains(to_text(needle).as_str()),
        [needle, Value::Array(items), ..] => items.iter().any(|item| loose_eq(item, needle)),
        _ => false,
    };
    Ok(Value::Bool(found))
}

/// 对象的有序键列表或数组的下标列表，其他类型返回空列表
pub(crate) fn keys(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let subject = args
        .first()
        .map(|arg| engine.resolve_value(arg, data))
        .unwrap_or(Value::Null);

    let keys = match subject {
        Value::Object(map) => map.keys().cloned().map(Value::String).collect(),
        Value::Array(items) => (0..items.len()).map(Value::from).collect(),
        _ => Vec::new(),
    };
    Ok(Value::Array(keys))
}

/// 所有列出的路径都存在（值可以为 null）；空列表为 false
pub(crate) fn exists(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let paths = resolve_all(engine, args, data);
    let found = !paths.is_empty() && paths.iter().all(|path| variable::exists(path, data));
    Ok(Value::Bool(found))
}

/// 字符数、元素数或属性数；没有长度的类型返回错误
pub(crate) fn length(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let mut values = resolve_all(engine, args, data);
    let subject = if values.len() == 1 {
        values.swap_remove(0)
    } else {
        Value::Array(values)
    };

    match subject {
        Value::String(s) => Ok(Value::from(s.chars().count())),
        Value::Array(items) => Ok(Value::from(items.len())),
        Value::Object(map) => Ok(Value::from(map.len())),
        other => Err(RuleError::UndefinedLength(type_name(&other).to_string())),
    }
}

/// `[container, path, default?]`：安全取值，路径可为点号字符串、数字下标或键列表
pub(crate) fn get(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let mut values = resolve_all(engine, args, data).into_iter();
    let container = values.next().unwrap_or(Value::Null);
    let path = values.next().unwrap_or(Value::Null);
    let default = values.next().unwrap_or(Value::Null);

    let found = match &path {
        Value::Null => Some(&container),
        Value::Array(keys) => walk(&container, keys),
        other => key_text(other).and_then(|key| get_path(&container, &key)),
    };
    Ok(found.cloned().unwrap_or(default))
}

/// 返回第一个既非 null 也非空字符串的操作数
pub(crate) fn coalesce(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    for arg in args {
        let value = engine.resolve_value(arg, data);
        if !is_blank(&value) {
            return Ok(value);
        }
    }
    Ok(Value::Null)
}

/// 返回查找结果为缺失、null 或空字符串的键
pub(crate) fn missing(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let resolved = resolve_all(engine, args, data);
    let keys = match resolved.first() {
        Some(Value::Array(keys)) => keys.clone(),
        _ => resolved,
    };
    Ok(Value::Array(missing_keys(engine, &keys, data)))
}

/// `[min_required, keys]`：至少 min_required 个键存在时返回空列表，否则同 `missing`
pub(crate) fn missing_some(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let resolved = resolve_all(engine, args, data);
    let min_required = resolved.first().and_then(to_number).unwrap_or(0.0);
    let keys = match resolved.get(1) {
        Some(Value::Array(keys)) => keys.as_slice(),
        Some(_) => {
            return Err(RuleError::invalid_arguments(
                Operator::MissingSome.as_str(),
                "第二个参数必须是键列表",
            ))
        }
        None => &[][..],
    };

    let missing = missing_keys(engine, keys, data);
    let present = keys.len() - missing.len();
    if present as f64 >= min_required {
        Ok(Value::Array(Vec::new()))
    } else {
        Ok(Value::Array(missing))
    }
}

fn missing_keys(engine: &JsonLogic, keys: &[Value], data: &Value) -> Vec<Value> {
    keys.iter()
        .filter(|key| variable::lookup(engine, key, data).is_none_or(|value| is_blank(&value)))
        .cloned()
        .collect()
}

/// 将第一个操作数写入日志输出并原样返回
pub(crate) fn log(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let value = args
        .first()
        .map(|arg| engine.resolve_value(arg, data))
        .unwrap_or(Value::Null);
    engine.emit_log(&value);
    Ok(value)
}
