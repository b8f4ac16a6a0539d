use crate::assertion::types::{AssertError, Assertion, StatusExpectation};

/// 解析测试块中的一行 `key: value` 断言
///
/// 支持的格式（key 大小写不敏感）：
/// - `Status: 200` / `Status: 2xx`
/// - `Content-Type: application/json`
/// - `Body:`（占位，不做检查）
/// - `$.data.id: 42`
/// - `Custom-Assert: ./check.js`
/// - 其它 key 视为 Header 断言
pub fn parse_assertion(key: &str, value: &str) -> Result<Assertion, AssertError> {
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() {
        return Err(AssertError::InvalidSyntax(format!(
            "empty assertion key (value: {})",
            value
        )));
    }

    let lower = key.to_ascii_lowercase();

    match lower.as_str() {
        "status" => Ok(Assertion::Status {
            expected: parse_status(value)?,
        }),
        "content-type" => Ok(Assertion::Header {
            key: "Content-Type".to_string(),
            value: value.to_string(),
        }),
        "body" => Ok(Assertion::Body {
            path: "$".to_string(),
            expected: String::new(),
        }),
        "custom-assert" | "_customassert" => {
            if value.is_empty() {
                return Err(AssertError::InvalidSyntax(
                    "custom assertion without script".to_string(),
                ));
            }
            Ok(Assertion::Custom {
                script: value.to_string(),
            })
        }
        _ if key.starts_with('$') => Ok(Assertion::Body {
            path: key.to_string(),
            expected: value.to_string(),
        }),
        _ => Ok(Assertion::Header {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// 解析状态码期望：`200` 或 `1xx`-`5xx`
fn parse_status(value: &str) -> Result<StatusExpectation, AssertError> {
    let lower = value.to_ascii_lowercase();

    if let Some(class) = lower.strip_suffix("xx") {
        return match class.parse::<u8>() {
            Ok(class @ 1..=5) => Ok(StatusExpectation::Class(class)),
            _ => Err(AssertError::InvalidSyntax(format!(
                "invalid status class: {}",
                value
            ))),
        };
    }

    match value.parse::<u16>() {
        Ok(code) if (100..600).contains(&code) => Ok(StatusExpectation::Code(code)),
        _ => Err(AssertError::InvalidSyntax(format!(
            "invalid status code: {}",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_assertion("Status", "200").unwrap(), Assertion::status(200));
        assert_eq!(
            parse_assertion("status", "2xx").unwrap(),
            Assertion::Status {
                expected: StatusExpectation::Class(2)
            }
        );
        assert_eq!(
            parse_assertion("STATUS", "4XX").unwrap(),
            Assertion::Status {
                expected: StatusExpectation::Class(4)
            }
        );
    }

    #[test]
    fn test_parse_status_invalid() {
        assert!(parse_assertion("Status", "ok").is_err());
        assert!(parse_assertion("Status", "7xx").is_err());
        assert!(parse_assertion("Status", "99").is_err());
        assert!(parse_assertion("Status", "").is_err());
    }

    #[test]
    fn test_parse_content_type() {
        assert_eq!(
            parse_assertion("content-type", "application/json").unwrap(),
            Assertion::Header {
                key: "Content-Type".to_string(),
                value: "application/json".to_string()
            }
        );
    }

    #[test]
    fn test_parse_body_placeholder() {
        assert_eq!(
            parse_assertion("Body", "").unwrap(),
            Assertion::Body {
                path: "$".to_string(),
                expected: String::new()
            }
        );
    }

    #[test]
    fn test_parse_json_path() {
        assert_eq!(
            parse_assertion("$.data.name", "Alice").unwrap(),
            Assertion::Body {
                path: "$.data.name".to_string(),
                expected: "Alice".to_string()
            }
        );
    }

    #[test]
    fn test_parse_custom() {
        assert_eq!(
            parse_assertion("Custom-Assert", "./check.js").unwrap(),
            Assertion::Custom {
                script: "./check.js".to_string()
            }
        );
        assert_eq!(
            parse_assertion("_CustomAssert", "has_token").unwrap(),
            Assertion::Custom {
                script: "has_token".to_string()
            }
        );
        assert!(parse_assertion("Custom-Assert", "").is_err());
    }

    #[test]
    fn test_parse_other_header() {
        assert_eq!(
            parse_assertion("X-Request-Id", "abc").unwrap(),
            Assertion::Header {
                key: "X-Request-Id".to_string(),
                value: "abc".to_string()
            }
        );
        assert!(parse_assertion("  ", "abc").is_err());
    }
}
