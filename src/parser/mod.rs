pub mod body;
pub mod converter;
pub mod http_file;
pub mod line;
pub mod multipart;
pub mod types;

use crate::variable::VariableManager;

// Re-export commonly used types
pub use http_file::{HttpFileParser, ParserMode};
pub use types::{
    FormPart, ParseError, ParseResult, ParsedFile, ParsedRequest, PartKind, RequestBody, TestItem,
};

/// 从文件路径解析 HTTP 文件
pub fn parse_file<P: AsRef<std::path::Path>>(
    path: P,
    variables: &mut VariableManager,
) -> ParseResult<ParsedFile> {
    HttpFileParser::parse_file(variables, path)
}

/// 从字符串内容解析 HTTP 请求
pub fn parse_content(content: &str, variables: &mut VariableManager) -> ParseResult<ParsedFile> {
    HttpFileParser::new(variables).parse(content)
}
