//! 逻辑与分支操作符：`and`、`or`、`if`/`?:`、`!`、`!!`
//!
//! `and`/`or` 按顺序惰性解析并短路，返回的是值本身而不是布尔值。

use crate::coercion::truthy;
use crate::error::Result;
use crate::evaluator::JsonLogic;
use serde_json::Value;

/// 返回第一个假值，全部为真时返回最后一个值；空列表返回 false
pub(crate) fn and(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let mut last = Value::Bool(false);
    for arg in args {
        last = engine.resolve_value(arg, data);
        if !truthy(&last) {
            return Ok(last);
        }
    }
    Ok(last)
}

/// 返回第一个真值，全部为假时返回最后一个值；空列表返回 false
pub(crate) fn or(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let mut last = Value::Bool(false);
    for arg in args {
        last = engine.resolve_value(arg, data);
        if truthy(&last) {
            return Ok(last);
        }
    }
    Ok(last)
}

/// 多分支条件：`[cond1, then1, cond2, then2, ..., else]`
///
/// 偶数长度时隐含 `null` 作为 else 分支；单元素时直接解析返回。
pub(crate) fn if_then_else(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    if let [single] = args {
        return Ok(engine.resolve_value(single, data));
    }

    for pair in args.chunks(2) {
        match pair {
            [condition, then, ..] => {
                if truthy(&engine.resolve_value(condition, data)) {
                    return Ok(engine.resolve_value(then, data));
                }
            }
            [otherwise] => return Ok(engine.resolve_value(otherwise, data)),
            [] => {}
        }
    }

    Ok(Value::Null)
}

pub(crate) fn not(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    Ok(Value::Bool(!truthy(&negation_subject(engine, args, data))))
}

pub(crate) fn double_not(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    Ok(Value::Bool(truthy(&negation_subject(engine, args, data))))
}

/// 取反操作的主体：单元素解析该元素，否则整个列表参与真值判断
fn negation_subject(engine: &JsonLogic, args: &[Value], data: &Value) -> Value {
    match args {
        [single] => engine.resolve_value(single, data),
        _ => Value::Array(
            args.iter()
                .map(|arg| engine.resolve_value(arg, data))
                .collect(),
        ),
    }
}
