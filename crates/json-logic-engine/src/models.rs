//! 规则引擎领域模型
//!
//! 规则与数据都是任意 JSON 值。一个节点是否为操作节点只取决于它的形状：
//! 恰好只有一个键的对象。数组的键是连续整数，因此永远是字面量，但其元素仍会逐个解析。

use serde_json::Value;

/// 规则节点（字面量或操作节点）的借用视图
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleNode<'a> {
    Literal(&'a Value),
    Operation {
        operator: &'a str,
        operand: &'a Value,
    },
}

impl<'a> RuleNode<'a> {
    /// 按形状对规则节点分类
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Object(map) if map.len() == 1 => match map.iter().next() {
                Some((operator, operand)) => RuleNode::Operation {
                    operator: operator.as_str(),
                    operand,
                },
                None => RuleNode::Literal(value),
            },
            _ => RuleNode::Literal(value),
        }
    }

    pub fn is_operation(&self) -> bool {
        matches!(self, RuleNode::Operation { .. })
    }
}

/// 判断值是否为操作节点
pub fn is_logic(value: &Value) -> bool {
    RuleNode::classify(value).is_operation()
}

/// 获取操作节点的操作符名称
pub fn get_operator(value: &Value) -> Option<&str> {
    match RuleNode::classify(value) {
        RuleNode::Operation { operator, .. } => Some(operator),
        RuleNode::Literal(_) => None,
    }
}

/// 获取操作节点的操作数（未做单值包装）
pub fn get_values(value: &Value) -> Option<&Value> {
    match RuleNode::classify(value) {
        RuleNode::Operation { operand, .. } => Some(operand),
        RuleNode::Literal(_) => None,
    }
}

/// 判断节点是否为 `{"var": ""}` 形式的当前元素引用
///
/// `{"var": null}` 与 `{"var": []}` 同样解析为上下文本身，一并视为当前元素引用。
pub(crate) fn is_current_item_ref(value: &Value) -> bool {
    match RuleNode::classify(value) {
        RuleNode::Operation {
            operator: "var",
            operand,
        } => match operand {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(arr) => arr.is_empty(),
            _ => false,
        },
        _ => false,
    }
}
