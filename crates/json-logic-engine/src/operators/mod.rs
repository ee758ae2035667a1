//! 内置操作符定义与分发
//!
//! 操作符按族拆分到子模块；本模块负责名称映射、操作数规范化以及分发到对应的处理函数。

pub mod arithmetic;
pub mod collection;
pub mod comparison;
pub mod iteration;
pub mod logic;
pub mod string;
pub mod variable;

use crate::error::Result;
use crate::evaluator::JsonLogic;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// 内置操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // 数据访问
    Var,
    Val,
    Preserve,

    // 逻辑与分支
    And,
    Or,
    If,
    Not,
    DoubleNot,

    // 比较
    Eq,
    StrictEq,
    Neq,
    StrictNeq,
    Gt,
    Gte,
    Lt,
    Lte,

    // 算术
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Max,
    Min,

    // 字符串
    Cat,
    Substr,
    Contains,
    StartsWith,
    EndsWith,

    // 集合与工具
    Merge,
    In,
    Keys,
    Exists,
    Length,
    Get,
    Coalesce,
    Missing,
    MissingSome,
    EachKey,
    Log,

    // 迭代
    Map,
    Filter,
    Reduce,
    All,
    NoneOf,
    SomeOf,
}

impl Operator {
    /// 按名称查找内置操作符
    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name {
            "var" => Self::Var,
            "val" => Self::Val,
            "preserve" => Self::Preserve,
            "and" => Self::And,
            "or" => Self::Or,
            "if" | "?:" => Self::If,
            "!" => Self::Not,
            "!!" => Self::DoubleNot,
            "==" => Self::Eq,
            "===" => Self::StrictEq,
            "!=" => Self::Neq,
            "!==" => Self::StrictNeq,
            ">" => Self::Gt,
            ">=" => Self::Gte,
            "<" => Self::Lt,
            "<=" => Self::Lte,
            "+" => Self::Add,
            "-" => Self::Subtract,
            "*" => Self::Multiply,
            "/" => Self::Divide,
            "%" => Self::Modulo,
            "max" => Self::Max,
            "min" => Self::Min,
            "cat" => Self::Cat,
            "substr" => Self::Substr,
            "contains" => Self::Contains,
            "startsWith" => Self::StartsWith,
            "endsWith" => Self::EndsWith,
            "merge" => Self::Merge,
            "in" => Self::In,
            "keys" => Self::Keys,
            "exists" => Self::Exists,
            "length" => Self::Length,
            "get" => Self::Get,
            "??" => Self::Coalesce,
            "missing" => Self::Missing,
            "missing_some" => Self::MissingSome,
            "eachKey" => Self::EachKey,
            "log" => Self::Log,
            "map" => Self::Map,
            "filter" => Self::Filter,
            "reduce" => Self::Reduce,
            "all" => Self::All,
            "none" => Self::NoneOf,
            "some" => Self::SomeOf,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Val => "val",
            Self::Preserve => "preserve",
            Self::And => "and",
            Self::Or => "or",
            Self::If => "if",
            Self::Not => "!",
            Self::DoubleNot => "!!",
            Self::Eq => "==",
            Self::StrictEq => "===",
            Self::Neq => "!=",
            Self::StrictNeq => "!==",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Max => "max",
            Self::Min => "min",
            Self::Cat => "cat",
            Self::Substr => "substr",
            Self::Contains => "contains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::Merge => "merge",
            Self::In => "in",
            Self::Keys => "keys",
            Self::Exists => "exists",
            Self::Length => "length",
            Self::Get => "get",
            Self::Coalesce => "??",
            Self::Missing => "missing",
            Self::MissingSome => "missing_some",
            Self::EachKey => "eachKey",
            Self::Log => "log",
            Self::Map => "map",
            Self::Filter => "filter",
            Self::Reduce => "reduce",
            Self::All => "all",
            Self::NoneOf => "none",
            Self::SomeOf => "some",
        }
    }

    /// 直接接收原始操作数、不做单值包装的操作符
    pub fn takes_raw_operand(&self) -> bool {
        matches!(self, Self::Var | Self::Val | Self::Preserve)
    }

    /// 比较操作符（也用于 `[op, [a, b]]` 内联比较简写）
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::StrictEq
                | Self::Neq
                | Self::StrictNeq
                | Self::Gt
                | Self::Gte
                | Self::Lt
                | Self::Lte
        )
    }

    /// 会为第二个操作数建立新作用域的操作符
    pub fn opens_scope(&self) -> bool {
        matches!(
            self,
            Self::Map
                | Self::Filter
                | Self::Reduce
                | Self::All
                | Self::NoneOf
                | Self::SomeOf
                | Self::EachKey
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 操作数规范化：非数组操作数包装为单元素列表
pub(crate) fn normalize(operand: &Value) -> Cow<'_, [Value]> {
    match operand {
        Value::Array(args) => Cow::Borrowed(args.as_slice()),
        other => Cow::Owned(vec![other.clone()]),
    }
}

/// 逐个解析操作数
pub(crate) fn resolve_all(engine: &JsonLogic, args: &[Value], data: &Value) -> Vec<Value> {
    args.iter()
        .map(|arg| engine.resolve_value(arg, data))
        .collect()
}

/// 分发接收原始操作数的操作符
pub(crate) fn apply_raw(
    engine: &JsonLogic,
    op: Operator,
    operand: &Value,
    data: &Value,
) -> Result<Value> {
    match op {
        Operator::Var => variable::var(engine, operand, data),
        Operator::Val => variable::val(engine, operand, data),
        _ => Ok(operand.clone()),
    }
}

/// 分发已规范化操作数的操作符
pub(crate) fn apply(
    engine: &JsonLogic,
    op: Operator,
    args: &[Value],
    data: &Value,
) -> Result<Value> {
    match op {
        Operator::Var | Operator::Val | Operator::Preserve => unreachable!(),

        Operator::And => logic::and(engine, args, data),
        Operator::Or => logic::or(engine, args, data),
        Operator::If => logic::if_then_else(engine, args, data),
        Operator::Not => logic::not(engine, args, data),
        Operator::DoubleNot => logic::double_not(engine, args, data),

        Operator::Eq
        | Operator::StrictEq
        | Operator::Neq
        | Operator::StrictNeq
        | Operator::Gt
        | Operator::Gte
        | Operator::Lt
        | Operator::Lte => comparison::compare(engine, op, args, data),

        Operator::Add => arithmetic::add(engine, args, data),
        Operator::Subtract => arithmetic::subtract(engine, args, data),
        Operator::Multiply => arithmetic::multiply(engine, args, data),
        Operator::Divide => arithmetic::divide(engine, args, data),
        Operator::Modulo => arithmetic::modulo(engine, args, data),
        Operator::Max => arithmetic::max(engine, args, data),
        Operator::Min => arithmetic::min(engine, args, data),

        Operator::Cat => string::cat(engine, args, data),
        Operator::Substr => string::substr(engine, args, data),
        Operator::Contains => string::contains(engine, args, data),
        Operator::StartsWith => string::starts_with(engine, args, data),
        Operator::EndsWith => string::ends_with(engine, args, data),

        Operator::Merge => collection::merge(engine, args, data),
        Operator::In => collection::in_haystack(engine, args, data),
        Operator::Keys => collection::keys(engine, args, data),
        Operator::Exists => collection::exists(engine, args, data),
        Operator::Length => collection::length(engine, args, data),
        Operator::Get => collection::get(engine, args, data),
        Operator::Coalesce => collection::coalesce(engine, args, data),
        Operator::Missing => collection::missing(engine, args, data),
        Operator::MissingSome => collection::missing_some(engine, args, data),
        Operator::Log => collection::log(engine, args, data),

        Operator::EachKey => iteration::each_key(engine, args, data),
        Operator::Map => iteration::map(engine, args, data),
        Operator::Filter => iteration::filter(engine, args, data),
        Operator::Reduce => iteration::reduce(engine, args, data),
        Operator::All => iteration::all(engine, args, data),
        Operator::NoneOf => iteration::none(engine, args, data),
        Operator::SomeOf => iteration::some(engine, args, data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_round_trip() {
        for name in ["var", "==", "!==", "missing_some", "eachKey", "none", "??", "startsWith"] {
            let op = Operator::from_name(name).unwrap();
            assert_eq!(op.as_str(), name);
            assert_eq!(op.to_string(), name);
        }
    }

    #[test]
    fn test_if_alias() {
        assert_eq!(Operator::from_name("?:"), Some(Operator::If));
        assert_eq!(Operator::from_name("unknown"), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(&json!(5)).as_ref(), &[json!(5)]);
        assert_eq!(normalize(&json!([1, 2])).as_ref(), &[json!(1), json!(2)]);
        assert_eq!(
            normalize(&json!({"var": "a"})).as_ref(),
            &[json!({"var": "a"})]
        );
    }

    #[test]
    fn test_operator_groups() {
        assert!(Operator::Var.takes_raw_operand());
        assert!(!Operator::Cat.takes_raw_operand());
        assert!(Operator::Lte.is_comparison());
        assert!(!Operator::In.is_comparison());
        assert!(Operator::Reduce.opens_scope());
        assert!(!Operator::Merge.opens_scope());
    }

    #[test]
    fn test_raw_operators_dispatch_unnormalized() {
        let engine = JsonLogic::new();
        let data = json!({"a": {"b": 2}});
        assert!(Operator::Preserve.takes_raw_operand());
        assert!(Operator::Val.takes_raw_operand());
        assert_eq!(
            engine.evaluate(&json!({"preserve": {"var": "a"}}), &data).unwrap(),
            json!({"var": "a"})
        );
        assert_eq!(
            engine.evaluate(&json!({"var": ["a.b", 0]}), &data).unwrap(),
            json!(2)
        );
    }
}
