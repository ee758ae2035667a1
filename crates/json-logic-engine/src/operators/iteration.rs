//! 迭代操作符：`map`、`filter`、`reduce`、`all`、`none`、`some`、`eachKey`
//!
//! 操作数形如 `[collection, logic(, extra)]`。集合只在外层上下文中解析一次，
//! 逻辑针对每个元素在新建的子作用域中求值，调用方的数据从不被修改。
//!
//! 子作用域规则：
//! - 元素为对象：外层上下文浅合并元素的键（元素优先），再加上 `current` 与 `index`
//! - 元素为标量（或数组）：同上，元素本身额外以 `_` 键暴露
//!
//! 逻辑中任意深度的 `{"var": ""}` 在求值前被替换为当前元素字面量，
//! 因此它总是指向当前元素而不是外层上下文。

use super::Operator;
use crate::coercion::{truthy, type_name};
use crate::error::{Result, RuleError};
use crate::evaluator::JsonLogic;
use crate::models::{is_current_item_ref, RuleNode};
use crate::path::get_path;
use serde_json::{Map, Value};

const CURRENT_KEY: &str = "current";
const INDEX_KEY: &str = "index";
const SCALAR_KEY: &str = "_";
const ACCUMULATOR_KEY: &str = "accumulator";

/// 构建单个元素的子作用域
pub(crate) fn item_context(outer: &Value, item: &Value, index: usize) -> Value {
    let mut scope = match outer {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    match item {
        Value::Object(fields) => {
            for (key, value) in fields {
                scope.insert(key.clone(), value.clone());
            }
        }
        other => {
            scope.insert(SCALAR_KEY.to_string(), other.clone());
        }
    }

    scope.insert(CURRENT_KEY.to_string(), item.clone());
    scope.insert(INDEX_KEY.to_string(), Value::from(index));
    Value::Object(scope)
}

/// 将逻辑中的当前元素引用替换为元素字面量
///
/// 嵌套的迭代操作符只替换其集合及额外参数，它们自己的逻辑参数保留原样，
/// 由内层迭代按其自身元素替换；`preserve` 子树不做替换。
pub(crate) fn substitute_item(logic: &Value, item: &Value) -> Value {
    if is_current_item_ref(logic) {
        return item_literal(item);
    }

    match RuleNode::classify(logic) {
        RuleNode::Operation { operator, operand } => {
            let op = Operator::from_name(operator);
            let substituted = match (op, operand) {
                (Some(Operator::Preserve), _) => operand.clone(),
                (Some(op), Value::Array(args)) if op.opens_scope() => Value::Array(
                    args.iter()
                        .enumerate()
                        .map(|(position, arg)| {
                            if position == 1 {
                                arg.clone()
                            } else {
                                substitute_item(arg, item)
                            }
                        })
                        .collect(),
                ),
                _ => substitute_item(operand, item),
            };
            let mut node = Map::with_capacity(1);
            node.insert(operator.to_string(), substituted);
            Value::Object(node)
        }
        RuleNode::Literal(Value::Array(values)) => Value::Array(
            values
                .iter()
                .map(|value| substitute_item(value, item))
                .collect(),
        ),
        RuleNode::Literal(Value::Object(fields)) => Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), substitute_item(value, item)))
                .collect(),
        ),
        RuleNode::Literal(other) => other.clone(),
    }
}

/// 容器类元素用 `preserve` 包裹，避免被当作规则再次解析
fn item_literal(item: &Value) -> Value {
    match item {
        Value::Array(_) | Value::Object(_) => {
            let mut node = Map::with_capacity(1);
            node.insert(Operator::Preserve.as_str().to_string(), item.clone());
            Value::Object(node)
        }
        scalar => scalar.clone(),
    }
}

/// 在元素子作用域中对逻辑求值
fn evaluate_for_item(
    engine: &JsonLogic,
    logic: &Value,
    outer: &Value,
    item: &Value,
    index: usize,
) -> Value {
    let scope = item_context(outer, item, index);
    let logic = substitute_item(logic, item);
    engine.resolve_value(&logic, &scope)
}

/// 解析集合参数，非数组返回 None
fn resolve_collection(engine: &JsonLogic, args: &[Value], data: &Value) -> Option<Vec<Value>> {
    match args.first().map(|expr| engine.resolve_value(expr, data)) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

pub(crate) fn map(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let (Some(items), Some(logic)) = (resolve_collection(engine, args, data), args.get(1)) else {
        return Ok(Value::Array(Vec::new()));
    };
    if is_current_item_ref(logic) {
        return Ok(Value::Array(items));
    }

    let mapped = items
        .iter()
        .enumerate()
        .map(|(index, item)| evaluate_for_item(engine, logic, data, item, index))
        .collect();
    Ok(Value::Array(mapped))
}

pub(crate) fn filter(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let (Some(items), Some(logic)) = (resolve_collection(engine, args, data), args.get(1)) else {
        return Ok(Value::Array(Vec::new()));
    };
    if is_current_item_ref(logic) {
        return Ok(Value::Array(items.into_iter().filter(truthy).collect()));
    }

    let kept = items
        .iter()
        .enumerate()
        .filter(|(index, item)| truthy(&evaluate_for_item(engine, logic, data, item, *index)))
        .map(|(_, item)| item.clone())
        .collect();
    Ok(Value::Array(kept))
}

/// 左折叠，逻辑只能看到 `{current, accumulator}`
///
/// 初始值在外层上下文中解析一次；集合为空或不是数组时原样返回初始值。
pub(crate) fn reduce(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let initial = args
        .get(2)
        .map(|expr| engine.resolve_value(expr, data))
        .unwrap_or(Value::Null);

    let (Some(items), Some(logic)) = (resolve_collection(engine, args, data), args.get(1)) else {
        return Ok(initial);
    };

    let folded = items.into_iter().fold(initial, |accumulator, current| {
        let mut scope = Map::with_capacity(2);
        scope.insert(CURRENT_KEY.to_string(), current);
        scope.insert(ACCUMULATOR_KEY.to_string(), accumulator);
        engine.resolve_value(logic, &Value::Object(scope))
    });
    Ok(folded)
}

/// 空集合为 false；遇到第一个假值短路
pub(crate) fn all(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let (items, logic) = quantifier_inputs(engine, Operator::All, args, data)?;
    if items.is_empty() {
        return Ok(Value::Bool(false));
    }
    let passed = items
        .iter()
        .enumerate()
        .all(|(index, item)| item_matches(engine, logic, data, item, index));
    Ok(Value::Bool(passed))
}

/// 空集合为 true；遇到第一个真值短路
pub(crate) fn none(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let (items, logic) = quantifier_inputs(engine, Operator::NoneOf, args, data)?;
    let any = items
        .iter()
        .enumerate()
        .any(|(index, item)| item_matches(engine, logic, data, item, index));
    Ok(Value::Bool(!any))
}

/// 空集合为 false；遇到第一个真值短路
pub(crate) fn some(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let (items, logic) = quantifier_inputs(engine, Operator::SomeOf, args, data)?;
    let any = items
        .iter()
        .enumerate()
        .any(|(index, item)| item_matches(engine, logic, data, item, index));
    Ok(Value::Bool(any))
}

fn quantifier_inputs<'a>(
    engine: &JsonLogic,
    op: Operator,
    args: &'a [Value],
    data: &Value,
) -> Result<(Vec<Value>, &'a Value)> {
    let collection = args
        .first()
        .map(|expr| engine.resolve_value(expr, data))
        .unwrap_or(Value::Null);

    let items = match collection {
        Value::Array(items) => items,
        Value::Null => return Err(RuleError::invalid_arguments(op.as_str(), "缺少集合参数")),
        other => {
            return Err(RuleError::invalid_arguments(
                op.as_str(),
                format!("集合必须是数组，实际为 {}", type_name(&other)),
            ))
        }
    };
    let logic = args
        .get(1)
        .ok_or_else(|| RuleError::invalid_arguments(op.as_str(), "缺少判断逻辑"))?;

    Ok((items, logic))
}

/// `{"var": "prop"}` 形式的逻辑直接按属性取值，不构建完整子作用域
fn item_matches(engine: &JsonLogic, logic: &Value, outer: &Value, item: &Value, index: usize) -> bool {
    match direct_property(logic) {
        Some(property) => get_path(item, property).is_some_and(truthy),
        None => truthy(&evaluate_for_item(engine, logic, outer, item, index)),
    }
}

fn direct_property(logic: &Value) -> Option<&str> {
    match RuleNode::classify(logic) {
        RuleNode::Operation {
            operator: "var",
            operand: Value::String(property),
        } if !property.is_empty() => Some(property.as_str()),
        _ => None,
    }
}

/// 对对象的每个键值对（或数组的每个下标/元素）求值，返回有序的 `[key, result]` 列表
///
/// 作用域在外层上下文基础上暴露 `key`、`value` 与 `current: {key, value}`。
pub(crate) fn each_key(engine: &JsonLogic, args: &[Value], data: &Value) -> Result<Value> {
    let subject = args
        .first()
        .map(|expr| engine.resolve_value(expr, data))
        .unwrap_or(Value::Null);
    let logic = args.get(1).ok_or_else(|| {
        RuleError::invalid_arguments(Operator::EachKey.as_str(), "缺少求值逻辑")
    })?;

    let entries: Vec<(Value, Value)> = match subject {
        Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| (Value::String(key), value))
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, value)| (Value::from(index), value))
            .collect(),
        _ => Vec::new(),
    };

    let results = entries
        .into_iter()
        .map(|(key, value)| {
            let scope = pair_context(data, &key, &value);
            let result = engine.resolve_value(logic, &scope);
            Value::Array(vec![key, result])
        })
        .collect();
    Ok(Value::Array(results))
}

fn pair_context(outer: &Value, key: &Value, value: &Value) -> Value {
    let mut scope = match outer {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    let mut current = Map::with_capacity(2);
    current.insert("key".to_string(), key.clone());
    current.insert("value".to_string(), value.clone());

    scope.insert("key".to_string(), key.clone());
    scope.insert("value".to_string(), value.clone());
    scope.insert(CURRENT_KEY.to_string(), Value::Object(current));
    Value::Object(scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(rule: Value, data: Value) -> Value {
        JsonLogic::new().evaluate(&rule, &data).unwrap()
    }

    #[test]
    fn test_item_context_for_object() {
        let outer = json!({"threshold": 3, "name": "outer"});
        let scope = item_context(&outer, &json!({"name": "inner", "qty": 5}), 2);
        assert_eq!(scope["threshold"], json!(3));
        assert_eq!(scope["name"], json!("inner"));
        assert_eq!(scope["current"], json!({"name": "inner", "qty": 5}));
        assert_eq!(scope["index"], json!(2));
        assert!(scope.get("_").is_none());
    }

    #[test]
    fn test_item_context_for_scalar() {
        let scope = item_context(&json!([1, 2]), &json!(7), 0);
        assert_eq!(scope, json!({"_": 7, "current": 7, "index": 0}));
    }

    #[test]
    fn test_substitute_item() {
        let logic = json!({"==": [{"%": [{"var": ""}, 2]}, 0]});
        assert_eq!(
            substitute_item(&logic, &json!(4)),
            json!({"==": [{"%": [4, 2]}, 0]})
        );

        // 容器元素被 preserve 包裹
        assert_eq!(
            substitute_item(&json!({"var": ""}), &json!({"a": 1})),
            json!({"preserve": {"a": 1}})
        );

        // 内层迭代的逻辑保持不变，但集合参数被替换
        let nested = json!({"map": [{"var": ""}, {"var": ""}]});
        assert_eq!(
            substitute_item(&nested, &json!([1, 2])),
            json!({"map": [{"preserve": [1, 2]}, {"var": ""}]})
        );
    }

    #[test]
    fn test_map() {
        let data = json!({"nums": [1, 2, 3]});
        assert_eq!(
            eval(json!({"map": [{"var": "nums"}, {"*": [{"var": ""}, 2]}]}), data.clone()),
            json!([2, 4, 6])
        );
        assert_eq!(
            eval(json!({"map": [{"var": "nums"}, {"var": ""}]}), data.clone()),
            json!([1, 2, 3])
        );
        assert_eq!(
            eval(json!({"map": [{"var": "nums"}, {"+": [{"var": "_"}, {"var": "index"}]}]}), data),
            json!([1, 3, 5])
        );
        assert_eq!(eval(json!({"map": [5, {"var": ""}]}), json!(null)), json!([]));
    }

    #[test]
    fn test_map_over_objects_sees_outer_context() {
        let data = json!({
            "rate": 2,
            "items": [{"qty": 1}, {"qty": 4}]
        });
        let rule = json!({"map": [{"var": "items"}, {"*": [{"var": "qty"}, {"var": "rate"}]}]});
        assert_eq!(eval(rule, data), json!([2, 8]));
    }

    #[test]
    fn test_filter() {
        let data = json!({"nums": [1, 2, 3, 4, 5, 6]});
        assert_eq!(
            eval(
                json!({"filter": [{"var": "nums"}, {"==": [{"%": [{"var": ""}, 2]}, 0]}]}),
                data
            ),
            json!([2, 4, 6])
        );
        assert_eq!(
            eval(json!({"filter": [[0, 1, "", "a"], {"var": ""}]}), json!(null)),
            json!([1, "a"])
        );
    }

    #[test]
    fn test_reduce() {
        let data = json!({"nums": [1, 2, 3, 4, 5]});
        let rule = json!({"reduce": [
            {"var": "nums"},
            {"+": [{"var": "accumulator"}, {"var": "current"}]},
            0
        ]});
        assert_eq!(eval(rule, data), json!(15));
    }

    #[test]
    fn test_reduce_initial_and_narrow_scope() {
        let data = json!({"start": 10, "outer": 100, "nums": []});
        assert_eq!(
            eval(json!({"reduce": [{"var": "nums"}, {"var": "outer"}, {"var": "start"}]}), data.clone()),
            json!(10)
        );
        assert_eq!(
            eval(json!({"reduce": [[1], {"var": "outer"}, 0]}), data.clone()),
            json!(null)
        );
        assert_eq!(
            eval(json!({"reduce": ["nope", {"var": "current"}, 7]}), data),
            json!(7)
        );
    }

    #[test]
    fn test_quantifiers_on_empty() {
        let logic = json!({">": [{"var": ""}, 0]});
        assert_eq!(eval(json!({"all": [[], logic.clone()]}), json!(null)), json!(false));
        assert_eq!(eval(json!({"none": [[], logic.clone()]}), json!(null)), json!(true));
        assert_eq!(eval(json!({"some": [[], logic]}), json!(null)), json!(false));
    }

    #[test]
    fn test_quantifiers() {
        let logic = json!({">": [{"var": ""}, 0]});
        assert_eq!(eval(json!({"all": [[1, 2, 3], logic.clone()]}), json!(null)), json!(true));
        assert_eq!(eval(json!({"all": [[1, -2, 3], logic.clone()]}), json!(null)), json!(false));
        assert_eq!(eval(json!({"none": [[-1, -2], logic.clone()]}), json!(null)), json!(true));
        assert_eq!(eval(json!({"some": [[-1, 2], logic]}), json!(null)), json!(true));
    }

    #[test]
    fn test_quantifier_direct_property() {
        let data = json!({"users": [{"active": true}, {"active": 1}, {"active": "yes"}]});
        assert_eq!(
            eval(json!({"all": [{"var": "users"}, {"var": "active"}]}), data.clone()),
            json!(true)
        );
        let data = json!({"users": [{"active": true}, {"name": "x"}]});
        assert_eq!(
            eval(json!({"all": [{"var": "users"}, {"var": "active"}]}), data.clone()),
            json!(false)
        );
        assert_eq!(
            eval(json!({"none": [{"var": "users"}, {"var": "banned"}]}), data),
            json!(true)
        );
    }

    #[test]
    fn test_quantifier_invalid_arguments() {
        let engine = JsonLogic::new();
        let err = engine
            .evaluate(&json!({"all": [{"var": "missing"}, true]}), &json!({}))
            .unwrap_err();
        assert!(matches!(err, RuleError::InvalidArguments { ref operator, .. } if operator == "all"));

        let err = engine
            .evaluate(&json!({"some": [5, true]}), &json!({}))
            .unwrap_err();
        assert!(matches!(err, RuleError::InvalidArguments { .. }));

        let err = engine
            .evaluate(&json!({"none": [[1, 2]]}), &json!({}))
            .unwrap_err();
        assert!(matches!(err, RuleError::InvalidArguments { .. }));
    }

    #[test]
    fn test_nested_iteration_keeps_inner_item() {
        let data = json!({"matrix": [[1, 2], [3, 4]]});
        let rule = json!({"map": [
            {"var": "matrix"},
            {"map": [{"var": ""}, {"*": [{"var": ""}, 10]}]}
        ]});
        assert_eq!(eval(rule, data), json!([[10, 20], [30, 40]]));
    }

    #[test]
    fn test_each_key() {
        let data = json!({"prices": {"apple": 2, "pear": 3}, "tax": 1});
        let rule = json!({"eachKey": [
            {"var": "prices"},
            {"+": [{"var": "value"}, {"var": "tax"}]}
        ]});
        assert_eq!(eval(rule, data.clone()), json!([["apple", 3], ["pear", 4]]));

        let rule = json!({"eachKey": [{"var": "prices"}, {"var": "current.key"}]});
        assert_eq!(eval(rule, data), json!([["apple", "apple"], ["pear", "pear"]]));

        assert_eq!(
            eval(json!({"eachKey": [["x"], {"var": "key"}]}), json!(null)),
            json!([[0, 0]])
        );
    }
}
