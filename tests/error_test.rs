use rucheck::config::ConfigError;
use rucheck::http::RequestError;
use rucheck::parser::ParseError;
use rucheck::{Result, RucheckError};

#[test]
fn test_parse_error() {
    let err = RucheckError::ParseError("test error".to_string());
    assert_eq!(err.to_string(), "解析错误: test error");
}

#[test]
fn test_orphan_test_is_validation_error() {
    let err: RucheckError = ParseError::OrphanTest { line: 3 }.into();
    assert!(matches!(err, RucheckError::ValidationError(_)));
    assert_eq!(
        err.to_string(),
        "校验错误: Test block at line 3 has no enclosing request"
    );
}

#[test]
fn test_missing_url_is_parse_error() {
    let err: RucheckError = ParseError::MissingUrl { line: 2 }.into();
    assert!(matches!(err, RucheckError::ParseError(ref msg) if msg == "Missing URL at line 2"));
}

#[test]
fn test_request_error_conversion() {
    let err: RucheckError = RequestError::Network("connection reset".to_string()).into();
    assert_eq!(err.to_string(), "请求失败: Network error: connection reset");
}

#[test]
fn test_config_error_conversion() {
    let err: RucheckError = ConfigError::InvalidDuration("soon".to_string()).into();
    assert!(matches!(err, RucheckError::ConfigError(_)));
    assert!(err.to_string().contains("Invalid duration: soon"));
}

#[test]
fn test_error_conversion_from_anyhow() {
    let anyhow_err = anyhow::anyhow!("test anyhow error");
    let rucheck_err: RucheckError = anyhow_err.into();
    assert!(rucheck_err.to_string().contains("test anyhow error"));
}

#[test]
fn test_result_type() {
    fn returns_error() -> Result<()> {
        Err(RucheckError::ParseError("test".to_string()))
    }

    match returns_error() {
        Err(RucheckError::ParseError(msg)) => assert_eq!(msg, "test"),
        _ => panic!("Expected ParseError"),
    }
}
