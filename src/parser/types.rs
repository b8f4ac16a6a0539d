use crate::assertion::Assertion;
use crate::http::Method;
use crate::variable::VariableUpdate;
use serde::Serialize;
use std::path::PathBuf;

/// 单个解析后的 HTTP 请求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedRequest {
    /// 请求名称（`### <name>`）
    pub name: String,

    /// HTTP 方法，缺失时为 GET
    pub method: Method,

    /// 请求 URL（解析时已做第一次变量替换）
    pub url: String,

    /// Headers 列表，保持原始顺序
    pub headers: Vec<(String, String)>,

    /// 请求体
    pub body: RequestBody,

    /// 测试块
    pub tests: Vec<TestItem>,

    /// 响应到达后执行的变量更新规则
    pub variable_updates: Vec<VariableUpdate>,

    /// 期望该请求失败
    pub expect_error: bool,

    /// 请求在文件中的起始行号（用于错误报告）
    pub line_number: usize,
}

impl ParsedRequest {
    /// 创建一个新的空请求
    pub fn new(name: impl Into<String>, line_number: usize) -> Self {
        Self {
            name: name.into(),
            method: Method::default(),
            url: String::new(),
            headers: Vec::new(),
            body: RequestBody::None,
            tests: Vec::new(),
            variable_updates: Vec::new(),
            expect_error: false,
            line_number,
        }
    }

    /// 设置 Header（名称大小写不敏感，后写覆盖先写）
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&key))
        {
            Some(entry) => *entry = (key, value),
            None => self.headers.push((key, value)),
        }
    }

    /// 获取 Header 值（名称大小写不敏感）
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }
}

/// 请求体
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum RequestBody {
    #[default]
    None,

    /// 文本（JSON、XML、纯文本等）
    Text(String),

    /// application/x-www-form-urlencoded 键值对
    Form(Vec<(String, String)>),

    /// multipart/form-data 各部分
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    pub fn is_none(&self) -> bool {
        matches!(self, RequestBody::None)
    }
}

/// multipart 的一个部分
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormPart {
    pub name: String,
    pub kind: PartKind,
}

/// multipart 部分的内容
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PartKind {
    /// 普通文本字段
    Text { value: String },

    /// 内联文件内容
    Inline {
        filename: String,
        content_type: Option<String>,
        #[serde(skip)]
        data: Vec<u8>,
    },

    /// 磁盘文件（发送时流式读取）
    File {
        path: PathBuf,
        filename: String,
        content_type: Option<String>,
    },
}

/// 测试块（`#### <label>`）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestItem {
    /// 测试名称：`<请求名> <标签>`
    pub name: String,

    pub assertions: Vec<Assertion>,
}

impl TestItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assertions: Vec::new(),
        }
    }
}

/// 整个文件的解析结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedFile {
    /// 解析出的所有请求（文件顺序）
    pub requests: Vec<ParsedRequest>,

    /// 源文件路径（用于错误报告）
    pub source_path: Option<PathBuf>,
}

impl ParsedFile {
    /// 创建一个新的空文件解析结果
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置源文件路径
    pub fn with_source_path(mut self, path: PathBuf) -> Self {
        self.source_path = Some(path);
        self
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// 解析错误类型
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 请求行缺少 URL
    #[error("Missing URL at line {line}")]
    MissingUrl { line: usize },

    /// 测试块出现在任何请求之前
    #[error("Test block at line {line} has no enclosing request")]
    OrphanTest { line: usize },

    /// 空文件或没有找到请求
    #[error("No requests found in file")]
    NoRequests,

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 解析结果类型别名
pub type ParseResult<T> = Result<T, ParseError>;
