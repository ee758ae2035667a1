//! 规则静态分析
//!
//! 不求值，只遍历规则树：提取引用的变量路径、计算嵌套深度。

use crate::models::RuleNode;
use crate::path::key_text;
use serde_json::Value;
use std::collections::BTreeSet;

/// 规则中 `var` 引用的所有变量路径（排序、去重）
///
/// `[path, default]` 形式取第一个元素；空路径和非字符串/数字路径不计入。
/// 迭代操作符逻辑中的引用相对于元素作用域，同样原样收集。
pub fn uses_data(rule: &Value) -> Vec<String> {
    let mut paths = BTreeSet::new();
    collect_paths(rule, &mut paths);
    paths.into_iter().collect()
}

fn collect_paths(node: &Value, paths: &mut BTreeSet<String>) {
    match RuleNode::classify(node) {
        RuleNode::Operation { operator, operand } => {
            if operator == "var" {
                let path = match operand {
                    Value::Array(parts) => parts.first(),
                    other => Some(other),
                };
                if let Some(path) = path.and_then(key_text).filter(|p| !p.is_empty()) {
                    paths.insert(path);
                }
            }
            collect_paths(operand, paths);
        }
        RuleNode::Literal(Value::Array(items)) => {
            for item in items {
                collect_paths(item, paths);
            }
        }
        RuleNode::Literal(Value::Object(fields)) => {
            for value in fields.values() {
                collect_paths(value, paths);
            }
        }
        RuleNode::Literal(_) => {}
    }
}

/// 规则树的最大嵌套深度，标量为 1
pub fn rule_depth(rule: &Value) -> usize {
    match rule {
        Value::Array(items) => 1 + items.iter().map(rule_depth).max().unwrap_or(0),
        Value::Object(fields) => 1 + fields.values().map(rule_depth).max().unwrap_or(0),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_uses_data() {
        let rule = json!({"and": [
            {"<": [{"var": "temp"}, 110]},
            {"==": [{"var": "pie.filling"}, "apple"]},
            {">": [{"var": ["temp", 0]}, {"var": 1}]}
        ]});
        assert_eq!(uses_data(&rule), vec!["1", "pie.filling", "temp"]);
    }

    #[test]
    fn test_uses_data_inside_iteration() {
        let rule = json!({"filter": [
            {"var": "orders"},
            {">=": [{"var": "amount"}, {"var": ["min", {"var": "fallback"}]}]}
        ]});
        assert_eq!(uses_data(&rule), vec!["amount", "fallback", "min", "orders"]);
    }

    #[test]
    fn test_uses_data_skips_item_refs() {
        let rule = json!({"map": [[1, 2], {"*": [{"var": ""}, {"var": null}]}]});
        assert!(uses_data(&rule).is_empty());
        assert!(uses_data(&json!(42)).is_empty());
    }

    #[test]
    fn test_rule_depth() {
        assert_eq!(rule_depth(&json!(1)), 1);
        assert_eq!(rule_depth(&json!([])), 1);
        assert_eq!(rule_depth(&json!({"var": "a"})), 2);
        assert_eq!(rule_depth(&json!({"==": [{"var": "a"}, 1]})), 4);
    }
}
