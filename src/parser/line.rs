use crate::http::Method;

/// 一行文本的分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,

    /// `#` 开头且不是请求/测试标记
    Comment,

    /// `@name=value`
    Variable { name: &'a str, value: &'a str },

    /// `@` 开头但缺少 `=` 或名称为空
    MalformedVariable,

    /// `### <name>`
    RequestStart(&'a str),

    /// `#### <label>`
    TestStart(&'a str),

    /// `GET <url>`，URL 缺失时为 None
    RequestLine {
        method: Method,
        url: Option<&'a str>,
    },

    /// `key: value`
    KeyValue { key: &'a str, value: &'a str },

    /// 其它文本
    Text(&'a str),
}

/// 按优先级分类一行
pub fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim_end();
    let trimmed = line.trim_start();

    if trimmed.is_empty() {
        return Line::Blank;
    }

    if let Some(name) = line.strip_prefix("### ") {
        return Line::RequestStart(name.trim());
    }
    if let Some(label) = line.strip_prefix("#### ") {
        return Line::TestStart(label.trim());
    }
    if trimmed.starts_with('#') {
        return Line::Comment;
    }

    if let Some(declaration) = trimmed.strip_prefix('@') {
        return match declaration.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => Line::Variable {
                name: name.trim(),
                value: value.trim(),
            },
            _ => Line::MalformedVariable,
        };
    }

    if let Some(request_line) = classify_request_line(trimmed) {
        return request_line;
    }

    if let Some((key, value)) = trimmed.split_once(':') {
        return Line::KeyValue {
            key: key.trim(),
            value: value.trim(),
        };
    }

    Line::Text(trimmed)
}

/// `METHOD url [HTTP/x.y]`，方法大小写敏感
fn classify_request_line(line: &str) -> Option<Line<'_>> {
    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest),
        None => (line, ""),
    };
    let method = Method::from_keyword(keyword)?;
    let url = rest.split_whitespace().next();
    Some(Line::RequestLine { method, url })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_and_comments() {
        assert_eq!(classify("### Login"), Line::RequestStart("Login"));
        assert_eq!(classify("#### Check status "), Line::TestStart("Check status"));
        assert_eq!(classify("# a comment"), Line::Comment);
        assert_eq!(classify("   # indented"), Line::Comment);
        // 没有名称的标记按注释处理
        assert_eq!(classify("###"), Line::Comment);
        assert_eq!(classify("####"), Line::Comment);
        assert_eq!(classify("##### deeper"), Line::Comment);
    }

    #[test]
    fn test_variable_lines() {
        assert_eq!(
            classify("@base_url = http://localhost:3000"),
            Line::Variable {
                name: "base_url",
                value: "http://localhost:3000"
            }
        );
        // 只在第一个 = 处分割
        assert_eq!(
            classify("@query=a=b"),
            Line::Variable {
                name: "query",
                value: "a=b"
            }
        );
        assert_eq!(classify("@novalue"), Line::MalformedVariable);
        assert_eq!(classify("@=value"), Line::MalformedVariable);
    }

    #[test]
    fn test_request_lines() {
        assert_eq!(
            classify("POST {{base}}/users"),
            Line::RequestLine {
                method: Method::Post,
                url: Some("{{base}}/users")
            }
        );
        assert_eq!(
            classify("GET http://x/y HTTP/1.1"),
            Line::RequestLine {
                method: Method::Get,
                url: Some("http://x/y")
            }
        );
        assert_eq!(
            classify("DELETE"),
            Line::RequestLine {
                method: Method::Delete,
                url: None
            }
        );
        // 小写方法不是请求行
        assert_eq!(
            classify("get: value"),
            Line::KeyValue {
                key: "get",
                value: "value"
            }
        );
    }

    #[test]
    fn test_key_value_and_text() {
        assert_eq!(
            classify("Authorization: Bearer a:b"),
            Line::KeyValue {
                key: "Authorization",
                value: "Bearer a:b"
            }
        );
        assert_eq!(classify("just text"), Line::Text("just text"));
        assert_eq!(classify("   "), Line::Blank);
        assert_eq!(classify("\r"), Line::Blank);
    }
}
