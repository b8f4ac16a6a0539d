use crate::http::Response;
use crate::variable::capture::{UpdateExpression, VariableUpdate};
use crate::variable::manager::VariableManager;
use crate::variable::types::VariableValue;
use serde_json::Value;
use thiserror::Error;

/// 变量更新错误（导致整个请求失败）
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Response body is not valid JSON (needed for {key}): {message}")]
    InvalidJson { key: String, message: String },

    #[error("Invalid JSONPath {path} for {key}: {message}")]
    InvalidPath {
        key: String,
        path: String,
        message: String,
    },

    #[error("JSONPath {path} not found in response (variable {key})")]
    NotFound { key: String, path: String },

    #[error("JSONPath {path} matched {count} values, expected exactly one (variable {key})")]
    Ambiguous {
        key: String,
        path: String,
        count: usize,
    },
}

/// 响应处理器：在响应到达后执行请求中的变量更新规则
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseProcessor;

impl ResponseProcessor {
    pub fn new() -> Self {
        Self
    }

    /// 按顺序执行更新规则
    ///
    /// 前面规则写入的变量对后面的规则可见。遇到第一个错误即返回
    pub fn process(
        &self,
        response: &Response,
        updates: &[VariableUpdate],
        variables: &mut VariableManager,
    ) -> Result<(), UpdateError> {
        tracing::debug!(
            "Processing response with status {} ({} update rule(s))",
            response.status.code(),
            updates.len()
        );

        // Body 只在第一次需要时解析
        let mut body: Option<Value> = None;

        for update in updates {
            let value = match update.parsed() {
                UpdateExpression::JsonPath(path) => {
                    if body.is_none() {
                        body = Some(response.json().map_err(|e| UpdateError::InvalidJson {
                            key: update.key.clone(),
                            message: e.to_string(),
                        })?);
                    }
                    match body.as_ref() {
                        Some(json) => Self::extract(json, &path, &update.key)?,
                        None => continue,
                    }
                }
                UpdateExpression::Reference(name) => match variables.get_variable(&name) {
                    Some(value) => value.clone(),
                    None => {
                        tracing::warn!(
                            "Variable {} referenced by {} is not defined, using empty string",
                            name,
                            update.key
                        );
                        VariableValue::String(String::new())
                    }
                },
                UpdateExpression::Template(template) => {
                    VariableValue::number_or_string(&variables.replace_variables(&template))
                }
                UpdateExpression::Bool(b) => VariableValue::Bool(b),
                UpdateExpression::Quoted(text) => VariableValue::String(text),
                UpdateExpression::Literal(text) => VariableValue::number_or_string(&text),
            };

            tracing::debug!("Updated variable: {} = {}", update.key, value);
            variables.set_variable(update.key.clone(), value);
        }

        Ok(())
    }

    fn extract(json: &Value, path: &str, key: &str) -> Result<VariableValue, UpdateError> {
        let matches = jsonpath_lib::select(json, path).map_err(|e| UpdateError::InvalidPath {
            key: key.to_string(),
            path: path.to_string(),
            message: e.to_string(),
        })?;

        match matches.as_slice() {
            [] => Err(UpdateError::NotFound {
                key: key.to_string(),
                path: path.to_string(),
            }),
            [single] => Ok(VariableValue::from_json(single)),
            many => Err(UpdateError::Ambiguous {
                key: key.to_string(),
                path: path.to_string(),
                count: many.len(),
            }),
        }
    }
}
