//! 字符串操作符：`cat`、`substr`、`contains`、`startsWith`、`endsWith`

use super::resolve_all;
use crate::coercion::{loose_eq, to_number, to_text};
use crate::error::Result;
use crate::evaluator::JsonLogic;
use serde_json::Value;

/// 拼接所有操作数的文本形式
pub(crate) fn cat(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let text: String = resolve_all(engine, args, data).iter().map(to_text).collect();
    Ok(Value::String(text))
}

/// 截取子串：`[source, start, length?]`，负数起点/长度从末尾计算
pub(crate) fn substr(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let values = resolve_all(engine, args, data);
    let source = values.first().map(to_text).unwrap_or_default();
    let start = values.get(1).and_then(to_number).unwrap_or(0.0) as i64;
    let length = values.get(2).and_then(to_number).map(|l| l as i64);

    Ok(Value::String(slice_chars(&source, start, length)))
}

fn slice_chars(source: &str, start: i64, length: Option<i64>) -> String {
    let chars: Vec<char> = source.chars().collect();
    let total = chars.len() as i64;

    let from = if start < 0 {
        total.saturating_add(start).max(0)
    } else {
        start.min(total)
    };
    let to = match length {
        None => total,
        Some(len) if len < 0 => total.saturating_add(len).max(from),
        Some(len) => from.saturating_add(len).min(total),
    };

    if to <= from {
        return String::new();
    }
    chars[from as usize..to as usize].iter().collect()
}

/// 子串包含（仅字符串）或列表成员检查
pub(crate) fn contains(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let values = resolve_all(engine, args, data);
    let found = match values.as_slice() {
        [Value::String(haystack), Value::String(needle), ..] => haystack.contains(needle.as_str()),
        [Value::Array(items), needle, ..] => items.iter().any(|item| loose_eq(item, needle)),
        _ => false,
    };
    Ok(Value::Bool(found))
}

pub(crate) fn starts_with(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let values = resolve_all(engine, args, data);
    let matched = match values.as_slice() {
        [Value::String(s), Value::String(prefix), ..] => s.starts_with(prefix.as_str()),
        _ => false,
    };
    Ok(Value::Bool(matched))
}

pub(crate) fn ends_with(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let values = resolve_all(engine, args, data);
    let matched = match values.as_slice() {
        [Value::String(s), Value::String(suffix), ..] => s.ends_with(suffix.as_str()),
        _ => false,
    };
    Ok(Value::Bool(matched))
}
