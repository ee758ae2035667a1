//! 数据路径访问
//!
//! 点号路径取值（如 "user.profile.age" 或 "order.items.0.name"）以及
//! 逐键取值（`val` 使用，不拆分点号）。未命中返回 `None`，即"缺失"标记，
//! 与存在但为假值的 `null`/`""` 区分开。

use serde_json::Value;

/// 将路径段转为对象键
pub(crate) fn key_text(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 单层取值：对象按键，数组按非负整数下标
pub fn get_child<'a>(container: &'a Value, key: &str) -> Option<&'a Value> {
    match container {
        Value::Object(map) => map.get(key),
        Value::Array(arr) => {
            let index: usize = key.parse().ok()?;
            arr.get(index)
        }
        _ => None,
    }
}

/// 点号路径取值
///
/// 先尝试整段键直接命中（允许键中本身含点号），再按点号逐级下降。
pub fn get_path<'a>(container: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(hit) = get_child(container, path) {
        return Some(hit);
    }
    if !path.contains('.') {
        return None;
    }

    let mut current = container;
    for part in path.split('.') {
        current = get_child(current, part)?;
    }
    Some(current)
}

/// 点号路径取值，未命中时返回默认值
pub fn get_or<'a>(container: &'a Value, path: &str, default: &'a Value) -> &'a Value {
    get_path(container, path).unwrap_or(default)
}

/// 逐键取值，不拆分点号
pub fn walk<'a>(container: &'a Value, keys: &[Value]) -> Option<&'a Value> {
    let mut current = container;
    for key in keys {
        current = match (current, key) {
            (Value::Array(arr), Value::Number(n)) => arr.get(usize::try_from(n.as_u64()?).ok()?)?,
            _ => get_child(current, &key_text(key)?)?,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "event": {"type": "PURCHASE"},
            "order": {
                "amount": 1000,
                "items": [
                    {"name": "ticket", "price": 500},
                    {"name": "food", "price": 500}
                ]
            },
            "dotted.key": "direct",
            "empty": ""
        })
    }

    #[test]
    fn test_get_path() {
        let data = sample();
        assert_eq!(get_path(&data, "event.type"), Some(&json!("PURCHASE")));
        assert_eq!(get_path(&data, "order.amount"), Some(&json!(1000)));
        assert_eq!(get_path(&data, "order.items.0.name"), Some(&json!("ticket")));
        assert_eq!(get_path(&data, "dotted.key"), Some(&json!("direct")));
        assert_eq!(get_path(&data, "empty"), Some(&json!("")));
        assert_eq!(get_path(&data, "nonexistent"), None);
        assert_eq!(get_path(&data, "order.items.5.name"), None);
    }

    #[test]
    fn test_get_path_on_list() {
        let data = json!(["a", "b", "c"]);
        assert_eq!(get_path(&data, "1"), Some(&json!("b")));
        assert_eq!(get_path(&data, "x"), None);
        assert_eq!(get_path(&json!(5), "a"), None);
    }

    #[test]
    fn test_get_or() {
        let data = sample();
        let fallback = json!("n/a");
        assert_eq!(get_or(&data, "event.type", &fallback), &json!("PURCHASE"));
        assert_eq!(get_or(&data, "event.source", &fallback), &json!("n/a"));
    }

    #[test]
    fn test_walk() {
        let data = sample();
        assert_eq!(
            walk(&data, &[json!("order"), json!("items"), json!(1), json!("name")]),
            Some(&json!("food"))
        );
        assert_eq!(walk(&data, &[json!("dotted.key")]), Some(&json!("direct")));
        assert_eq!(walk(&data, &[json!("event.type")]), None);
        assert_eq!(walk(&data, &[]), Some(&data));
        assert_eq!(walk(&data, &[json!(true)]), None);
    }
}
