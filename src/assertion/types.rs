use serde::{Serialize, Serializer};
use std::fmt;

/// 断言错误类型
#[derive(Debug, thiserror::Error)]
pub enum AssertError {
    #[error("Invalid assertion syntax: {0}")]
    InvalidSyntax(String),

    #[error("Expected status {expected}, got {actual}")]
    StatusMismatch { expected: String, actual: u16 },

    #[error("Header {0} not found in response")]
    HeaderMissing(String),

    #[error("Expected header {key} to be {expected}, got {actual}")]
    HeaderMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("Response body is empty (expected {path})")]
    EmptyBody { path: String },

    #[error("Response body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid JSONPath {path}: {message}")]
    InvalidPath { path: String, message: String },

    #[error("JSONPath {0} not found in response")]
    PathNotFound(String),

    #[error("Expected {path} to be {expected}, got {actual}")]
    BodyMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Custom assertion {script} failed: {message}")]
    Custom { script: String, message: String },
}

/// 状态码谓词，例如 "状态码在 2xx 范围内"
#[derive(Clone, Copy)]
pub struct StatusPredicate {
    pub description: &'static str,
    pub check: fn(u16) -> bool,
}

impl StatusPredicate {
    /// 2xx
    pub const SUCCESS: StatusPredicate = StatusPredicate {
        description: "2xx",
        check: is_success,
    };

    pub fn matches(&self, code: u16) -> bool {
        (self.check)(code)
    }
}

// 函数指针不可比较，按描述判等
impl PartialEq for StatusPredicate {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description
    }
}

impl fmt::Debug for StatusPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusPredicate")
            .field("description", &self.description)
            .finish()
    }
}

fn is_success(code: u16) -> bool {
    (200..=299).contains(&code)
}

/// 状态码期望
#[derive(Debug, Clone, PartialEq)]
pub enum StatusExpectation {
    /// 精确状态码
    Code(u16),
    /// 状态码类别，2 表示 2xx
    Class(u8),
    /// 任意谓词
    Predicate(StatusPredicate),
}

impl StatusExpectation {
    pub fn matches(&self, code: u16) -> bool {
        match self {
            StatusExpectation::Code(expected) => *expected == code,
            StatusExpectation::Class(class) => code / 100 == u16::from(*class),
            StatusExpectation::Predicate(predicate) => predicate.matches(code),
        }
    }
}

impl fmt::Display for StatusExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusExpectation::Code(code) => write!(f, "{}", code),
            StatusExpectation::Class(class) => write!(f, "{}xx", class),
            StatusExpectation::Predicate(predicate) => write!(f, "{}", predicate.description),
        }
    }
}

impl Serialize for StatusExpectation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 单条断言
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assertion {
    /// 状态码断言
    Status { expected: StatusExpectation },

    /// Header 断言（期望值在执行时替换变量）
    Header { key: String, value: String },

    /// Body 断言：JSONPath + 原始期望值（执行时再做类型转换）
    Body { path: String, expected: String },

    /// 自定义校验器（函数名或脚本路径）
    Custom { script: String },
}

impl Assertion {
    pub fn status(code: u16) -> Self {
        Assertion::Status {
            expected: StatusExpectation::Code(code),
        }
    }

    /// 默认断言：状态码在 2xx 范围内
    pub fn success() -> Self {
        Assertion::Status {
            expected: StatusExpectation::Predicate(StatusPredicate::SUCCESS),
        }
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assertion::Status { expected } => write!(f, "status {}", expected),
            Assertion::Header { key, value } => write!(f, "header {}: {}", key, value),
            Assertion::Body { path, expected } => write!(f, "body {} == {}", path, expected),
            Assertion::Custom { script } => write!(f, "custom {}", script),
        }
    }
}
