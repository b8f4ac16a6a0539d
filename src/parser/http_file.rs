use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::assertion::{Assertion, parse_assertion};
use crate::parser::body::{BodyContext, clean_body, strategy_for};
use crate::parser::line::{Line, classify};
use crate::parser::types::{
    ParseError, ParseResult, ParsedFile, ParsedRequest, RequestBody, TestItem,
};
use crate::variable::{VariableManager, VariableUpdate};

/// 解析器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserMode {
    /// 尚未进入任何请求
    Idle,
    /// 请求行与 Header
    InRequest,
    /// 空行之后的请求体
    InBody,
    /// `####` 测试块
    InTest,
}

/// HTTP 文件解析器（有限状态机）
///
/// 解析过程中文件级 `@name=value` 直接写入变量存储，
/// 请求内的 `@name=value` 记录为响应后执行的更新规则。
/// `parse` 消耗解析器本身，因此无法对上一次运行的状态重复解析
pub struct HttpFileParser<'a> {
    variables: &'a mut VariableManager,
    base_dir: PathBuf,
    mode: ParserMode,
    requests: Vec<ParsedRequest>,
    current: Option<usize>,
    current_test: Option<usize>,
    request_line_seen: bool,
    body_lines: Vec<String>,
    custom_scripts: HashSet<String>,
}

impl<'a> HttpFileParser<'a> {
    pub fn new(variables: &'a mut VariableManager) -> Self {
        Self {
            variables,
            base_dir: PathBuf::from("."),
            mode: ParserMode::Idle,
            requests: Vec::new(),
            current: None,
            current_test: None,
            request_line_seen: false,
            body_lines: Vec::new(),
            custom_scripts: HashSet::new(),
        }
    }

    /// 相对路径（multipart 文件）的解析基准目录
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// 从文件路径解析，基准目录为文件所在目录
    pub fn parse_file<P: AsRef<Path>>(
        variables: &'a mut VariableManager,
        path: P,
    ) -> ParseResult<ParsedFile> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!("File content loaded: {}", path.display());

        let base_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let parsed = Self::new(variables).with_base_dir(base_dir).parse(&content)?;
        Ok(parsed.with_source_path(path.to_path_buf()))
    }

    /// 从字符串内容解析
    pub fn parse(mut self, content: &str) -> ParseResult<ParsedFile> {
        for (index, raw) in content.lines().enumerate() {
            self.feed(index + 1, raw)?;
        }
        self.finish_request();

        tracing::debug!("Total parsed requests: {}", self.requests.len());

        if self.requests.is_empty() {
            return Err(ParseError::NoRequests);
        }

        Ok(ParsedFile {
            requests: self.requests,
            source_path: None,
        })
    }

    fn feed(&mut self, line_number: usize, raw: &str) -> ParseResult<()> {
        tracing::trace!("Processing line {}: {}", line_number, raw);

        match classify(raw) {
            Line::Comment => {}
            Line::MalformedVariable => {
                tracing::warn!("Line {}: malformed variable declaration: {}", line_number, raw.trim());
            }
            Line::Variable { name, value } => self.handle_variable(name, value),
            Line::RequestStart(name) => self.start_request(name, line_number),
            Line::TestStart(label) => self.start_test(label, line_number)?,
            line => match self.mode {
                ParserMode::Idle => {
                    if line != Line::Blank {
                        tracing::debug!("Line {} outside of any request, skipping", line_number);
                    }
                }
                ParserMode::InRequest => self.handle_request_line(line, line_number)?,
                ParserMode::InBody => self.body_lines.push(raw.trim_end().to_string()),
                ParserMode::InTest => self.handle_test_line(line, line_number),
            },
        }

        Ok(())
    }

    fn handle_variable(&mut self, name: &str, value: &str) {
        if let Some(request) = self.current_request() {
            tracing::debug!("Added variable update to {}: {} = {}", request.name, name, value);
            request.variable_updates.push(VariableUpdate::new(name, value));
            return;
        }

        let value = self.variables.replace_variables(value);
        if self.variables.declare(name, value) {
            tracing::debug!("Set variable from file: {}", name);
        }
    }

    fn start_request(&mut self, name: &str, line_number: usize) {
        self.finish_request();

        tracing::debug!("Started new request: {}", name);
        self.requests.push(ParsedRequest::new(name, line_number));
        self.current = Some(self.requests.len() - 1);
        self.current_test = None;
        self.request_line_seen = false;
        self.body_lines.clear();
        self.custom_scripts.clear();
        self.mode = ParserMode::InRequest;
    }

    fn start_test(&mut self, label: &str, line_number: usize) -> ParseResult<()> {
        let Some(index) = self.current else {
            return Err(ParseError::OrphanTest { line: line_number });
        };

        let request = &mut self.requests[index];
        let name = if label.is_empty() {
            request.name.clone()
        } else {
            format!("{} {}", request.name, label)
        };
        tracing::debug!("Started new test: {}", name);

        request.tests.push(TestItem::new(name));
        self.current_test = Some(request.tests.len() - 1);
        self.mode = ParserMode::InTest;
        Ok(())
    }

    fn handle_request_line(&mut self, line: Line<'_>, line_number: usize) -> ParseResult<()> {
        match line {
            Line::RequestLine { method, url } => {
                let Some(url) = url else {
                    return Err(ParseError::MissingUrl { line: line_number });
                };
                let url = self.variables.replace_variables(url);
                if let Some(request) = self.current_request() {
                    tracing::debug!("Set method: {}, URL: {}", method, url);
                    request.method = method;
                    request.url = url;
                }
                self.request_line_seen = true;
            }
            Line::KeyValue { key, value } => {
                if Self::is_expect_error(key) {
                    self.set_expect_error(value);
                } else if key.is_empty() {
                    tracing::warn!("Line {}: header without a name, skipping", line_number);
                } else {
                    let value = self.variables.replace_variables(value);
                    if let Some(request) = self.current_request() {
                        tracing::debug!("Added header to {}: {}: {}", request.name, key, value);
                        request.set_header(key, value);
                    }
                }
            }
            Line::Blank => {
                if self.request_line_seen {
                    self.mode = ParserMode::InBody;
                }
            }
            other => {
                tracing::warn!("Line {}: unexpected content in request, skipping: {:?}", line_number, other);
            }
        }
        Ok(())
    }

    fn handle_test_line(&mut self, line: Line<'_>, line_number: usize) {
        let (key, value) = match line {
            Line::KeyValue { key, value } => (key, value),
            Line::Blank => return,
            other => {
                tracing::warn!("Line {}: unexpected content in test block, skipping: {:?}", line_number, other);
                return;
            }
        };

        if Self::is_expect_error(key) {
            self.set_expect_error(value);
            return;
        }

        let assertion = match parse_assertion(key, value) {
            Ok(assertion) => assertion,
            Err(e) => {
                tracing::warn!("Line {}: failed to parse assertion {}: {} ({})", line_number, key, value, e);
                return;
            }
        };

        // 同一请求内相同的自定义校验器只登记一次
        if let Assertion::Custom { script } = &assertion {
            if !self.custom_scripts.insert(script.clone()) {
                tracing::debug!("Custom assertion {} already registered for this request", script);
                return;
            }
        }

        if let (Some(request_index), Some(test_index)) = (self.current, self.current_test) {
            tracing::debug!("Added assertion: {}", assertion);
            self.requests[request_index].tests[test_index]
                .assertions
                .push(assertion);
        }
    }

    fn is_expect_error(key: &str) -> bool {
        key.eq_ignore_ascii_case("_expecterror")
    }

    fn set_expect_error(&mut self, value: &str) {
        if let Some(request) = self.current_request() {
            request.expect_error = value.trim().eq_ignore_ascii_case("true");
            tracing::debug!("Set expectError for {}: {}", request.name, request.expect_error);
        }
    }

    /// 结束当前请求：清理并解释请求体
    fn finish_request(&mut self) {
        let Some(index) = self.current.take() else {
            return;
        };

        let raw = clean_body(&self.body_lines.join("\n"));
        self.body_lines.clear();

        let request = &mut self.requests[index];
        if !raw.is_empty() {
            let content_type = request.content_type().unwrap_or_default().to_string();
            let strategy = strategy_for(Some(&content_type));
            let ctx = BodyContext {
                content_type: &content_type,
                base_dir: &self.base_dir,
                variables: &*self.variables,
            };
            request.body = strategy.interpret(&raw, &ctx);
            tracing::debug!("Interpreted body of {} as {}", request.name, strategy.name());
        } else {
            request.body = RequestBody::None;
        }

        tracing::debug!("Parsed request: {}, URL: {}", request.name, request.url);
    }

    fn current_request(&mut self) -> Option<&mut ParsedRequest> {
        match self.current {
            Some(index) => self.requests.get_mut(index),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::StatusExpectation;
    use crate::http::Method;
    use crate::parser::types::PartKind;
    use crate::variable::VariableValue;

    fn parse(content: &str) -> ParseResult<ParsedFile> {
        let mut vars = VariableManager::new();
        HttpFileParser::new(&mut vars).parse(content)
    }

    #[test]
    fn test_parse_simple_get() {
        let result = parse("### Simple\nGET http://example.com").unwrap();
        assert_eq!(result.requests.len(), 1);
        assert_eq!(result.requests[0].name, "Simple");
        assert_eq!(result.requests[0].method, Method::Get);
        assert_eq!(result.requests[0].url, "http://example.com");
        assert!(result.requests[0].tests.is_empty());
    }

    #[test]
    fn test_parse_with_headers_and_body() {
        let content = r#"
### Create
POST http://example.com/users
Content-Type: application/json
Authorization: Bearer token123

{
  "name": "test" # inline comment
}
"#;
        let result = parse(content).unwrap();
        let request = &result.requests[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.headers.len(), 2);
        assert_eq!(request.header("authorization"), Some("Bearer token123"));
        assert_eq!(
            request.body,
            RequestBody::Text("{\n  \"name\": \"test\"\n}".to_string())
        );
    }

    #[test]
    fn test_parse_multiple_requests_in_order() {
        let content = "### One\nGET http://example.com/1\n\n### Two\nDELETE http://example.com/2\n";
        let result = parse(content).unwrap();
        assert_eq!(result.requests.len(), 2);
        assert_eq!(result.requests[0].name, "One");
        assert_eq!(result.requests[1].method, Method::Delete);
        assert_eq!(result.requests[1].line_number, 4);
    }

    #[test]
    fn test_parse_tests_and_assertions() {
        let content = r#"
### Get user
GET http://example.com/users/1

#### Check status
Status: 200
Content-Type: application/json
$.name: Alice

#### Second
Status: 2xx
"#;
        let result = parse(content).unwrap();
        let request = &result.requests[0];
        assert_eq!(request.tests.len(), 2);
        assert_eq!(request.tests[0].name, "Get user Check status");
        assert_eq!(request.tests[0].assertions.len(), 3);
        assert_eq!(request.tests[0].assertions[0], Assertion::status(200));
        assert_eq!(
            request.tests[1].assertions[0],
            Assertion::Status {
                expected: StatusExpectation::Class(2)
            }
        );
        // 测试块不会进入请求体
        assert!(request.body.is_none());
    }

    #[test]
    fn test_file_scope_variables_first_seen_wins() {
        let mut vars = VariableManager::new();
        vars.set_variable("host", "http://from-file");
        let content = "@host=http://inline\n@path=/users\n### R\nGET {{host}}{{path}}\n";
        let result = HttpFileParser::new(&mut vars).parse(content).unwrap();

        assert_eq!(result.requests[0].url, "http://from-file/users");
        assert_eq!(vars.get_variable("host"), Some(&VariableValue::from("http://from-file")));
    }

    #[test]
    fn test_request_scope_variables_are_deferred() {
        let mut vars = VariableManager::new();
        let content = "### Login\nPOST http://x/login\n@token = $.token\n";
        let result = HttpFileParser::new(&mut vars).parse(content).unwrap();

        assert_eq!(
            result.requests[0].variable_updates,
            vec![VariableUpdate::new("token", "$.token")]
        );
        assert!(vars.get_variable("token").is_none());
    }

    #[test]
    fn test_unresolved_placeholder_kept_in_url() {
        let result = parse("### R\nGET {{later}}/x\n").unwrap();
        assert_eq!(result.requests[0].url, "{{later}}/x");
    }

    #[test]
    fn test_orphan_test_is_error() {
        let result = parse("#### Orphan\nStatus: 200\n### R\nGET http://x\n");
        assert!(matches!(result, Err(ParseError::OrphanTest { line: 1 })));
    }

    #[test]
    fn test_request_line_without_url() {
        let result = parse("### R\nGET\n");
        assert!(matches!(result, Err(ParseError::MissingUrl { line: 2 })));
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse(""), Err(ParseError::NoRequests)));
        assert!(matches!(
            parse("# only comments\n@x=1\n"),
            Err(ParseError::NoRequests)
        ));
    }

    #[test]
    fn test_expect_error_case_insensitive() {
        let content = "### R\nGET http://x\n_ExpectError: TRUE\n\n### S\nGET http://y\n#### T\n_expecterror: true\n";
        let result = parse(content).unwrap();
        assert!(result.requests[0].expect_error);
        assert!(result.requests[1].expect_error);
        // 不会被当成 Header
        assert!(result.requests[0].headers.is_empty());
    }

    #[test]
    fn test_custom_assert_registered_once_per_request() {
        let content = r#"
### R
GET http://x
#### A
Custom-Assert: check.js
#### B
Custom-Assert: check.js
_CustomAssert: other.js

### S
GET http://y
#### C
Custom-Assert: check.js
"#;
        let result = parse(content).unwrap();
        assert_eq!(result.requests[0].tests[0].assertions.len(), 1);
        assert_eq!(result.requests[0].tests[1].assertions.len(), 1);
        assert_eq!(
            result.requests[0].tests[1].assertions[0],
            Assertion::Custom {
                script: "other.js".to_string()
            }
        );
        assert_eq!(result.requests[1].tests[0].assertions.len(), 1);
    }

    #[test]
    fn test_malformed_assertion_skipped() {
        let content = "### R\nGET http://x\n#### T\nStatus: abc\nStatus: 200\n";
        let result = parse(content).unwrap();
        assert_eq!(result.requests[0].tests[0].assertions, vec![Assertion::status(200)]);
    }

    #[test]
    fn test_comments_dropped_everywhere() {
        let content = "# header\n### R\n# before request line\nPOST http://x\n# between headers\nX-A: 1\n\n# in body\nhello\n";
        let result = parse(content).unwrap();
        assert_eq!(result.requests[0].headers.len(), 1);
        assert_eq!(result.requests[0].body, RequestBody::Text("hello".to_string()));
    }

    #[test]
    fn test_bare_marker_is_comment() {
        let content = "### R\nGET http://x\n###\n";
        let result = parse(content).unwrap();
        assert_eq!(result.requests.len(), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "### R\r\nPOST http://x\r\nContent-Type: text/plain\r\n\r\nbody\r\n";
        let result = parse(content).unwrap();
        assert_eq!(result.requests[0].content_type(), Some("text/plain"));
        assert_eq!(result.requests[0].body, RequestBody::Text("body".to_string()));
    }

    #[test]
    fn test_multipart_uses_base_dir() {
        let content = "### Upload\nPOST http://x/upload\nContent-Type: multipart/form-data; boundary=B\n\n--B\nContent-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\n\n< ./a.txt\n--B--\n";
        let mut vars = VariableManager::new();
        let result = HttpFileParser::new(&mut vars)
            .with_base_dir("/data")
            .parse(content)
            .unwrap();

        let RequestBody::Multipart(parts) = &result.requests[0].body else {
            panic!("expected multipart body");
        };
        assert_eq!(
            parts[0].kind,
            PartKind::File {
                path: PathBuf::from("/data/./a.txt"),
                filename: "a.txt".to_string(),
                content_type: None,
            }
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let content = "@base=http://x\n### R\nGET {{base}}/a\n@id=$.id\n#### T\nStatus: 200\n";
        let first = parse(content).unwrap();
        let second = parse(content).unwrap();
        assert_eq!(first, second);
    }
}
