//! 自定义校验器
//!
//! 测试块中的 `Custom-Assert: <name>` 会先按名称查找进程内注册的函数，
//! 找不到时视为相对请求文件目录的脚本路径，以子进程方式执行

mod registry;
mod script;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use thiserror::Error;

use crate::http::Response;
use crate::parser::ParsedRequest;
use crate::variable::VariableValue;

pub use registry::ValidatorRegistry;
pub use script::ScriptValidator;

#[derive(Debug, Error)]
pub enum ValidatorError {
    /// 校验未通过
    #[error("{0}")]
    Failed(String),

    #[error("Validator script not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to run validator {}: {message}", path.display())]
    Spawn { path: PathBuf, message: String },

    #[error("Validator {} timed out after {millis}ms", path.display())]
    Timeout { path: PathBuf, millis: u128 },
}

/// 校验器可见的上下文
#[derive(Debug, Clone, Copy)]
pub struct ValidatorContext<'a> {
    pub request: &'a ParsedRequest,
    pub variables: &'a HashMap<String, VariableValue>,
}

impl ValidatorContext<'_> {
    pub fn to_json(&self) -> Value {
        json!({
            "request": self.request,
            "variables": self.variables,
        })
    }
}

/// 可插拔的校验回调：`(Response, Context) -> Result<(), Error>`
#[async_trait]
pub trait CustomValidator: Send + Sync {
    async fn validate(
        &self,
        response: &Response,
        context: &ValidatorContext<'_>,
    ) -> Result<(), ValidatorError>;
}

type ValidatorFn = dyn Fn(&Response, &ValidatorContext<'_>) -> Result<(), String> + Send + Sync;

/// 进程内函数校验器
#[derive(Clone)]
pub struct FnValidator {
    func: Arc<ValidatorFn>,
}

impl FnValidator {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Response, &ValidatorContext<'_>) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }
}

#[async_trait]
impl CustomValidator for FnValidator {
    async fn validate(
        &self,
        response: &Response,
        context: &ValidatorContext<'_>,
    ) -> Result<(), ValidatorError> {
        (self.func)(response, context).map_err(ValidatorError::Failed)
    }
}
