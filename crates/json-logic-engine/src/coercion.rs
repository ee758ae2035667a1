//! 类型转换与比较
//!
//! 所有操作符共享的真值判断、数值转换、宽松/严格相等和排序比较。

use serde_json::{Number, Value};
use std::cmp::Ordering;

/// 真值判断
///
/// `null`、`false`、`""` 与数值 0 为假；字符串 `"0"` 为真；
/// 数组和对象非空即为真；其余均为真。
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(arr) => !arr.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
    }
}

/// 宽松相等中与布尔值比较时使用的真值：数字字符串按数值判断，`"0"` 与 `"0.0"` 为假
fn loose_truthy(value: &Value) -> bool {
    match value {
        Value::String(s) => parse_numeric(s).map_or(!s.is_empty(), |f| f != 0.0),
        other => truthy(other),
    }
}

/// 解析数字字符串（允许首尾空白，拒绝 inf/NaN）
pub fn parse_numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// 严格数值：数字或数字字符串
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

/// 加减法使用的数值：额外接受布尔值（true=1, false=0）
pub fn to_arith_number(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        other => to_number(other),
    }
}

/// 比较使用的数值：额外接受 null（视为 0）
fn to_compare_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        other => to_arith_number(other),
    }
}

/// 将 f64 结果规范化为 JSON 数字，整数值输出为整数
pub fn number_value(f: f64) -> Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_992.0;
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_SAFE {
        return Value::Number(Number::from(f as i64));
    }
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

/// `==` 与 `!=` 使用的 null 转 0
pub fn null_as_zero(value: Value) -> Value {
    match value {
        Value::Null => Value::from(0),
        other => other,
    }
}

/// 宽松相等（带类型转换）
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), other) | (other, Value::Bool(x)) => *x == loose_truthy(other),
        (Value::Null, other) | (other, Value::Null) => !truthy(other),
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            match parse_numeric(s) {
                Some(f) => n.as_f64() == Some(f),
                None => n.to_string() == *s,
            }
        }
        (Value::String(x), Value::String(y)) => match (parse_numeric(x), parse_numeric(y)) {
            (Some(fx), Some(fy)) => fx == fy,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| loose_eq(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| loose_eq(v, other)))
        }
        _ => false,
    }
}

/// 严格相等（类型与值都必须一致，1 与 1.0 视为同一数字）
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| strict_eq(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| strict_eq(v, other)))
        }
        _ => a == b,
    }
}

/// 排序比较
///
/// 两个字符串中任一不是数字时按字典序比较；否则两侧都能转为数值时按数值比较；
/// 其余组合（数组、对象、非数字字符串与数字）不可比较。
pub fn loose_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Value::String(x), Value::String(y)) = (a, b) {
        if parse_numeric(x).is_none() || parse_numeric(y).is_none() {
            return Some(x.cmp(y));
        }
    }
    let x = to_compare_number(a)?;
    let y = to_compare_number(b)?;
    x.partial_cmp(&y)
}

/// 转为文本（`cat` 等字符串操作使用）
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// 值为 null 或空字符串
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// 获取值的类型名称
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthy_quirks() {
        assert!(truthy(&json!("0")));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!(0.0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!([])));
        assert!(!truthy(&json!({})));
        assert!(truthy(&json!([0])));
        assert!(truthy(&json!({"a": null})));
        assert!(truthy(&json!(-1)));
        assert!(truthy(&json!("false")));
    }

    #[test]
    fn test_number_value_normalization() {
        assert_eq!(number_value(3.0), json!(3));
        assert_eq!(number_value(-0.0), json!(0));
        assert_eq!(number_value(2.5), json!(2.5));
        assert_eq!(number_value(f64::NAN), json!(null));
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(to_number(&json!("12")), Some(12.0));
        assert_eq!(to_number(&json!(" 1.5 ")), Some(1.5));
        assert_eq!(to_number(&json!("abc")), None);
        assert_eq!(to_number(&json!("inf")), None);
        assert_eq!(to_number(&json!(true)), None);
        assert_eq!(to_arith_number(&json!(true)), Some(1.0));
    }

    #[test]
    fn test_loose_eq() {
        assert!(loose_eq(&json!(1), &json!("1")));
        assert!(loose_eq(&json!(1), &json!(1.0)));
        assert!(loose_eq(&json!("1.0"), &json!("1")));
        assert!(loose_eq(&json!(null), &json!("")));
        assert!(loose_eq(&json!(true), &json!(1)));
        assert!(loose_eq(&json!(false), &json!(0)));
        assert!(!loose_eq(&json!(0), &json!("a")));
        assert!(!loose_eq(&json!("abc"), &json!("ABC")));
        assert!(loose_eq(&json!([1, "2"]), &json!(["1", 2])));
    }

    #[test]
    fn test_loose_eq_bool_against_numeric_strings() {
        assert!(loose_eq(&json!(false), &json!("0")));
        assert!(loose_eq(&json!("0.0"), &json!(false)));
        assert!(loose_eq(&json!(true), &json!("2")));
        assert!(!loose_eq(&json!(true), &json!("0")));
        assert!(loose_eq(&json!(true), &json!("yes")));
        assert!(loose_eq(&json!(false), &json!("")));
        // 真值判断本身不受影响
        assert!(truthy(&json!("0")));
    }

    #[test]
    fn test_strict_eq() {
        assert!(strict_eq(&json!(1), &json!(1.0)));
        assert!(!strict_eq(&json!(1), &json!("1")));
        assert!(!strict_eq(&json!(null), &json!(0)));
        assert!(strict_eq(&json!({"a": [1]}), &json!({"a": [1]})));
    }

    #[test]
    fn test_loose_cmp() {
        assert_eq!(loose_cmp(&json!(2), &json!(1)), Some(Ordering::Greater));
        assert_eq!(loose_cmp(&json!("10"), &json!(9)), Some(Ordering::Greater));
        assert_eq!(loose_cmp(&json!("10"), &json!("9")), Some(Ordering::Greater));
        assert_eq!(loose_cmp(&json!("apple"), &json!("banana")), Some(Ordering::Less));
        assert_eq!(loose_cmp(&json!(null), &json!(0)), Some(Ordering::Equal));
        assert_eq!(loose_cmp(&json!("a"), &json!(1)), None);
        assert_eq!(loose_cmp(&json!([1]), &json!(1)), None);
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(&json!(null)), "");
        assert_eq!(to_text(&json!(true)), "true");
        assert_eq!(to_text(&json!(3)), "3");
        assert_eq!(to_text(&json!(3.5)), "3.5");
        assert_eq!(to_text(&json!([1, 2])), "[1,2]");
        assert_eq!(to_text(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
