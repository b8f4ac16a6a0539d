use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::assertion::extractor::{adjust_json_path, coerce_expected, deep_equal, select_first};
use crate::assertion::types::{AssertError, Assertion, StatusExpectation};
use crate::http::Response;
use crate::parser::ParsedRequest;
use crate::validator::{ValidatorContext, ValidatorRegistry};
use crate::variable::VariableManager;

/// 断言执行引擎
#[derive(Clone)]
pub struct AssertionEngine {
    /// 请求文件所在目录，用于解析校验脚本路径
    base_dir: PathBuf,
    validators: Arc<ValidatorRegistry>,
    timeout: Duration,
}

impl AssertionEngine {
    pub fn new(base_dir: impl Into<PathBuf>, validators: Arc<ValidatorRegistry>) -> Self {
        Self {
            base_dir: base_dir.into(),
            validators,
            timeout: Duration::from_secs(5),
        }
    }

    /// 设置脚本校验器的超时
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn assert(
        &self,
        assertion: &Assertion,
        response: &Response,
        request: &ParsedRequest,
        variables: &VariableManager,
    ) -> Result<(), AssertError> {
        tracing::debug!("Asserting {}", assertion);

        match assertion {
            Assertion::Status { expected } => assert_status(expected, response),
            Assertion::Header { key, value } => {
                assert_header(key, &variables.replace_variables(value), response)
            }
            Assertion::Body { path, expected } => {
                assert_body(path, &variables.replace_variables(expected), response)
            }
            Assertion::Custom { script } => {
                let validator = self
                    .validators
                    .resolve(script, &self.base_dir, self.timeout);
                let context = ValidatorContext {
                    request,
                    variables: variables.variables(),
                };
                validator
                    .validate(response, &context)
                    .await
                    .map_err(|e| AssertError::Custom {
                        script: script.clone(),
                        message: e.to_string(),
                    })
            }
        }
    }
}

fn assert_status(expected: &StatusExpectation, response: &Response) -> Result<(), AssertError> {
    let actual = response.status.code();
    if expected.matches(actual) {
        Ok(())
    } else {
        Err(AssertError::StatusMismatch {
            expected: expected.to_string(),
            actual,
        })
    }
}

fn assert_header(key: &str, expected: &str, response: &Response) -> Result<(), AssertError> {
    let actual = response
        .header(key)
        .ok_or_else(|| AssertError::HeaderMissing(key.to_string()))?;

    let matched = if key.eq_ignore_ascii_case("content-type") {
        media_type(actual).eq_ignore_ascii_case(media_type(expected))
    } else {
        actual == expected
    };

    if matched {
        Ok(())
    } else {
        Err(AssertError::HeaderMismatch {
            key: key.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

/// `application/json; charset=utf-8` -> `application/json`
fn media_type(value: &str) -> &str {
    value.split(';').next().unwrap_or_default().trim()
}

fn assert_body(path: &str, expected: &str, response: &Response) -> Result<(), AssertError> {
    if path == "$" {
        return Ok(());
    }

    if response.body.trim().is_empty() {
        return Err(AssertError::EmptyBody {
            path: path.to_string(),
        });
    }

    let root = response
        .json()
        .map_err(|e| AssertError::InvalidJson(e.to_string()))?;

    let path = adjust_json_path(path, &root);
    let actual = select_first(&root, &path)?;
    let expected_value = coerce_expected(expected);

    if deep_equal(&actual, &expected_value) {
        Ok(())
    } else {
        Err(AssertError::BodyMismatch {
            path,
            expected: expected_value.to_string(),
            actual: actual.to_string(),
        })
    }
}
