use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::http::Response;
use crate::validator::{CustomValidator, FnValidator, ScriptValidator, ValidatorContext};

/// 校验器注册表
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Arc<dyn CustomValidator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按名称注册校验器，同名覆盖
    pub fn register(&mut self, name: impl Into<String>, validator: Arc<dyn CustomValidator>) {
        let name = name.into();
        tracing::debug!("Registered custom validator: {}", name);
        self.validators.insert(name, validator);
    }

    /// 注册进程内函数
    pub fn register_fn<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&Response, &ValidatorContext<'_>) -> Result<(), String> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(FnValidator::new(func)));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// 解析 `Custom-Assert` 的值：已注册的名称优先，否则视为相对 base_dir 的脚本
    pub fn resolve(
        &self,
        script: &str,
        base_dir: &Path,
        timeout: Duration,
    ) -> Arc<dyn CustomValidator> {
        if let Some(validator) = self.validators.get(script) {
            return Arc::clone(validator);
        }

        let path = Path::new(script);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        };
        Arc::new(ScriptValidator::new(path, timeout))
    }
}
