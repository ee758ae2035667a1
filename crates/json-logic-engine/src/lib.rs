//! JsonLogic 规则引擎
//!
//! 规则与数据都是 JSON 值，规则可以作为数据在服务端与前端之间共享：
//! - 变量与路径解析（`var`、`val`、`missing`、`exists`、`get`）
//! - 逻辑、比较、算术、字符串、集合操作符
//! - 带元素作用域的迭代操作符（`map`、`filter`、`reduce`、`all`、`none`、`some`）
//! - 可注入的自定义操作符注册表
//!
//! ```
//! use json_logic::{apply, JsonLogic};
//! use serde_json::json;
//!
//! let rule = json!({"if": [{"<": [{"var": "temp"}, 0]}, "freezing", "fine"]});
//! assert_eq!(apply(&rule, &json!({"temp": -5})).unwrap(), json!("freezing"));
//!
//! let engine = JsonLogic::new();
//! assert_eq!(engine.evaluate(&json!({"+": [1, 2]}), &json!(null)).unwrap(), json!(3));
//! ```

pub mod analysis;
pub mod coercion;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod operators;
pub mod path;
pub mod registry;
pub mod sink;

pub use analysis::{rule_depth, uses_data};
pub use coercion::truthy;
pub use error::{RegistryError, Result, RuleError};
pub use evaluator::{apply, JsonLogic};
pub use models::{get_operator, get_values, is_logic, RuleNode};
pub use operators::Operator;
pub use registry::{CustomRule, RuleFactory, RuleRegistry};
pub use sink::{LogSink, SinkError, TracingSink};
