use thiserror::Error;

use crate::config::ConfigError;
use crate::http::RequestError;
use crate::parser::ParseError;

#[derive(Error, Debug)]
pub enum RucheckError {
    #[error("解析错误: {0}")]
    ParseError(String),

    #[error("校验错误: {0}")]
    ValidationError(String),

    #[error("请求失败: {0}")]
    RequestError(#[from] RequestError),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for RucheckError {
    fn from(err: anyhow::Error) -> Self {
        RucheckError::Other(err.to_string())
    }
}

impl From<ConfigError> for RucheckError {
    fn from(err: ConfigError) -> Self {
        RucheckError::ConfigError(err.to_string())
    }
}

// 孤立的测试块属于结构校验错误，其余解析错误归为 ParseError
impl From<ParseError> for RucheckError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::OrphanTest { .. } => RucheckError::ValidationError(err.to_string()),
            ParseError::Io(e) => RucheckError::IoError(e),
            other => RucheckError::ParseError(other.to_string()),
        }
    }
}

/// Result type for rucheck crate
pub type Result<T> = std::result::Result<T, RucheckError>;
