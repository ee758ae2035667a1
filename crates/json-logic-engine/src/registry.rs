//! 自定义规则注册表
//!
//! 注册表保存操作符名称到工厂的映射，并按名称缓存首次使用时创建的单例。
//! 引擎在分发时先查询注册表，因此自定义操作符会覆盖同名的内置操作符。
//!
//! 注册表应在启动时填充完毕。运行期间修改不会破坏注册表本身，
//! 但正在进行的求值看到修改前还是修改后的处理器是未定义的。

use crate::error::{RegistryError, Result};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// 自定义操作符
///
/// `operands` 为已解析的操作数列表，`data` 为未经处理的完整数据上下文，
/// 处理器可以借此自行解析嵌套子规则。
pub trait CustomRule: Send + Sync {
    /// 操作符名称
    fn operator_name(&self) -> &str;

    fn evaluate(&self, operands: &[Value], data: &Value) -> Result<Value>;
}

/// 创建自定义规则实例的工厂
pub type RuleFactory = Arc<dyn Fn() -> Arc<dyn CustomRule> + Send + Sync>;

/// 自定义规则注册表
#[derive(Default)]
pub struct RuleRegistry {
    factories: RwLock<HashMap<String, RuleFactory>>,
    /// 已实例化的单例缓存
    instances: DashMap<String, Arc<dyn CustomRule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按类型注册，名称取自 `R::default()` 报告的操作符名称
    pub fn register<R>(&self) -> std::result::Result<(), RegistryError>
    where
        R: CustomRule + Default + 'static,
    {
        let name = R::default().operator_name().to_string();
        self.register_factory(name, || Arc::new(R::default()) as Arc<dyn CustomRule>)
    }

    /// 按名称注册工厂，实例在首次使用时创建
    ///
    /// 重复注册同一名称会替换原有处理器并丢弃已缓存的实例。
    #[instrument(skip(self, factory))]
    pub fn register_factory<F>(
        &self,
        name: impl Into<String> + std::fmt::Debug,
        factory: F,
    ) -> std::result::Result<(), RegistryError>
    where
        F: Fn() -> Arc<dyn CustomRule> + Send + Sync + 'static,
    {
        let name = name.into();
        validate_name(&name)?;
        let replaced = self.install(&name, Arc::new(factory), None);

        if replaced {
            info!("自定义操作符已替换: {}", name);
        } else {
            info!("自定义操作符已注册: {}", name);
        }
        Ok(())
    }

    /// 注册已构建的实例
    pub fn register_instance(
        &self,
        rule: Arc<dyn CustomRule>,
    ) -> std::result::Result<(), RegistryError> {
        let name = rule.operator_name().to_string();
        validate_name(&name)?;
        let shared = Arc::clone(&rule);
        let replaced = self.install(&name, Arc::new(move || Arc::clone(&shared)), Some(rule));

        if replaced {
            info!("自定义操作符已替换: {}", name);
        } else {
            info!("自定义操作符已注册: {}", name);
        }
        Ok(())
    }

    /// 在写锁内替换工厂与缓存，返回是否覆盖了已有注册
    fn install(
        &self,
        name: &str,
        factory: RuleFactory,
        instance: Option<Arc<dyn CustomRule>>,
    ) -> bool {
        let mut factories = self.factories.write();
        let replaced = factories.insert(name.to_string(), factory).is_some();
        match instance {
            Some(rule) => {
                self.instances.insert(name.to_string(), rule);
            }
            None => {
                self.instances.remove(name);
            }
        }
        replaced
    }

    /// 获取处理器单例，未注册时返回 `Ok(None)`
    pub fn get(&self, name: &str) -> std::result::Result<Option<Arc<dyn CustomRule>>, RegistryError> {
        if let Some(rule) = self.instances.get(name) {
            return Ok(Some(Arc::clone(rule.value())));
        }

        let Some(factory) = self.factories.read().get(name).cloned() else {
            return Ok(None);
        };

        let rule = factory();
        if rule.operator_name() != name {
            return Err(RegistryError::NameMismatch {
                registered: name.to_string(),
                reported: rule.operator_name().to_string(),
            });
        }

        // 实例化期间名称可能被重新注册，此时不缓存旧工厂的产物
        let factories = self.factories.read();
        match factories.get(name) {
            Some(current) if Arc::ptr_eq(current, &factory) => {
                debug!("自定义操作符已实例化: {}", name);
                let cached = self
                    .instances
                    .entry(name.to_string())
                    .or_insert(rule)
                    .value()
                    .clone();
                Ok(Some(cached))
            }
            _ => Ok(Some(rule)),
        }
    }

    /// 直接调用已注册的处理器
    pub fn invoke(&self, name: &str, operands: &[Value], data: &Value) -> Result<Value> {
        let rule = self
            .get(name)?
            .ok_or_else(|| RegistryError::NotRegistered(name.to_string()))?;
        rule.evaluate(operands, data)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.read().contains_key(name)
    }

    /// 已注册的操作符名称（排序）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }

    /// 清空注册表（测试用）
    pub fn clear(&self) {
        let count = {
            let mut factories = self.factories.write();
            let count = factories.len();
            factories.clear();
            self.instances.clear();
            count
        };
        info!("已清空 {} 个自定义操作符", count);
    }
}

fn validate_name(name: &str) -> std::result::Result<(), RegistryError> {
    if name.is_empty() || name.trim() != name {
        return Err(RegistryError::InvalidName(name.to_string()));
    }
    Ok(())
}
