//! 算术操作符：`+`、`-`、`*`、`/`、`%`、`max`、`min`
//!
//! 数字字符串按数值参与运算；结果为整数值时输出 JSON 整数。

use super::resolve_all;
use crate::coercion::{number_value, to_arith_number, to_number};
use crate::error::Result;
use crate::evaluator::JsonLogic;
use serde_json::Value;

/// 求和：跳过非数值与数组，布尔值按 0/1 计；空列表为 0
pub(crate) fn add(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let sum: f64 = resolve_all(engine, args, data)
        .iter()
        .filter_map(to_arith_number)
        .sum();
    Ok(number_value(sum))
}

/// 左折叠减法；单个操作数取负
pub(crate) fn subtract(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let values = resolve_all(engine, args, data);
    let Some((first, rest)) = values.split_first() else {
        return Ok(Value::from(0));
    };

    let first = to_arith_number(first).unwrap_or(0.0);
    if rest.is_empty() {
        return Ok(number_value(-first));
    }

    let difference = rest
        .iter()
        .filter(|value| !value.is_array())
        .fold(first, |acc, value| acc - to_arith_number(value).unwrap_or(0.0));
    Ok(number_value(difference))
}

/// 连乘：任一操作数不是数值时立即返回 0；空列表为 1
pub(crate) fn multiply(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let mut product = 1.0;
    for value in resolve_all(engine, args, data) {
        match to_number(&value) {
            Some(n) => product *= n,
            None => return Ok(Value::from(0)),
        }
    }
    Ok(number_value(product))
}

/// 连除：被除数非数值、除数为 0 或非数值时返回 null
pub(crate) fn divide(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let values = resolve_all(engine, args, data);
    let (first, rest) = match values.as_slice() {
        [] => return Ok(Value::Null),
        [single] => return Ok(to_number(single).map(number_value).unwrap_or(Value::from(0))),
        [first, rest @ ..] => (first, rest),
    };

    let Some(mut quotient) = to_number(first) else {
        return Ok(Value::Null);
    };
    for divisor in rest {
        match to_number(divisor) {
            Some(d) if d != 0.0 => quotient /= d,
            _ => return Ok(Value::Null),
        }
    }
    Ok(number_value(quotient))
}

/// 取模：恰好两个数值操作数且除数不为 0，否则返回 null
pub(crate) fn modulo(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let values = resolve_all(engine, args, data);
    let result = match values.as_slice() {
        [a, b] => match (to_number(a), to_number(b)) {
            (Some(a), Some(b)) if b != 0.0 => number_value(a % b),
            _ => Value::Null,
        },
        _ => Value::Null,
    };
    Ok(result)
}

pub(crate) fn max(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    Ok(extremum(resolve_all(engine, args, data), f64::max))
}

pub(crate) fn min(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    Ok(extremum(resolve_all(engine, args, data), f64::min))
}

/// 扫描时跳过非数值与数组；找不到数值返回 null。单个操作数按加法规则转换，无法转换时为 0
fn extremum(values: Vec<Value>, pick: fn(f64, f64) -> f64) -> Value {
    match values.as_slice() {
        [Value::Array(inner)] => return extremum(inner.clone(), pick),
        [single] => return number_value(to_arith_number(single).unwrap_or(0.0)),
        _ => {}
    }

    values
        .iter()
        .filter_map(to_number)
        .reduce(pick)
        .map(number_value)
        .unwrap_or(Value::Null)
}
