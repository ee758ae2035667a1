//! 比较操作符：`==`、`!=`、`===`、`!==`、`>`、`>=`、`<`、`<=`

use super::{resolve_all, Operator};
use crate::coercion::{loose_cmp, loose_eq, null_as_zero, strict_eq};
use crate::error::Result;
use crate::evaluator::JsonLogic;
use serde_json::Value;
use std::cmp::Ordering;

pub(crate) fn compare(
    engine: &JsonLogic,
    op: Operator,
    args: &[Value],
    data: &Value,
) -> Result<Value> {
    let values = resolve_all(engine, args, data);
    Ok(Value::Bool(compare_values(op, values)))
}

/// 在已解析的操作数上执行比较
pub(crate) fn compare_values(op: Operator, values: Vec<Value>) -> bool {
    match op {
        Operator::Eq => loose_all_equal(values),
        Operator::Neq => !loose_all_equal(values),
        Operator::StrictEq => strict_all_equal(values),
        Operator::StrictNeq => !strict_all_equal(values),
        Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => ordered(op, values),
        _ => false,
    }
}

/// null 先转为 0，随后所有操作数都须与第一个宽松相等
fn loose_all_equal(values: Vec<Value>) -> bool {
    let mut values: Vec<Value> = values.into_iter().map(null_as_zero).collect();
    while values.len() < 2 {
        values.push(Value::from(0));
    }
    let first = &values[0];
    values[1..].iter().all(|other| loose_eq(first, other))
}

fn strict_all_equal(mut values: Vec<Value>) -> bool {
    while values.len() < 2 {
        values.push(Value::Null);
    }
    let first = &values[0];
    values[1..].iter().all(|other| strict_eq(first, other))
}

/// 两元比较或三元区间比较 `(a OP b) && (b OP c)`
fn ordered(op: Operator, values: Vec<Value>) -> bool {
    // 单个嵌套数组自动展开一层
    let values = match <[Value; 1]>::try_from(values) {
        Ok([Value::Array(inner)]) => inner,
        Ok([single]) => vec![single],
        Err(values) => values,
    };
    let values: Vec<Value> = values.into_iter().map(null_as_zero).collect();
    if values.len() < 2 {
        return false;
    }

    values.windows(2).all(|pair| {
        let Some(ordering) = loose_cmp(&pair[0], &pair[1]) else {
            return false;
        };
        match op {
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Gte => ordering != Ordering::Less,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Lte => ordering != Ordering::Greater,
            _ => false,
        }
    })
}
