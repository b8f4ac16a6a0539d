use crate::variable::resolver::VariableResolver;
use crate::variable::types::VariableValue;
use std::collections::HashMap;

/// 一次运行内的变量存储
///
/// 执行是严格串行的，存储由 `&mut` 独占，不需要加锁
#[derive(Debug, Clone, Default)]
pub struct VariableManager {
    variables: HashMap<String, VariableValue>,
}

impl VariableManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置变量（后写覆盖先写）
    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<VariableValue>) {
        let key = key.into();
        let value = value.into();
        tracing::debug!("Set variable: {} = {}", key, value);
        self.variables.insert(key, value);
    }

    /// 获取变量值
    pub fn get_variable(&self, key: &str) -> Option<&VariableValue> {
        self.variables.get(key)
    }

    /// 批量合并变量，已存在的同名变量被覆盖
    pub fn set_variables<I, K>(&mut self, variables: I)
    where
        I: IntoIterator<Item = (K, VariableValue)>,
        K: Into<String>,
    {
        for (key, value) in variables {
            self.set_variable(key, value);
        }
    }

    /// 文件级变量声明：先到先得
    ///
    /// 变量文件先于解析加载，因此其中的值会覆盖文件内的默认值
    pub fn declare(&mut self, key: impl Into<String>, value: impl Into<VariableValue>) -> bool {
        let key = key.into();
        if self.variables.contains_key(&key) {
            tracing::debug!("Variable {} already exists, skipping", key);
            return false;
        }
        self.set_variable(key, value);
        true
    }

    /// 替换文本中所有 {{name}} 占位符
    pub fn replace_variables(&self, text: &str) -> String {
        VariableResolver::substitute(text, &self.variables)
    }

    /// 所有变量的只读视图
    pub fn variables(&self) -> &HashMap<String, VariableValue> {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
